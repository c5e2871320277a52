pub mod shared {
    pub mod analysis_error;
    pub mod cancellation;
    pub mod collection;
    pub mod constants;
    pub mod embedding;
    pub mod gallery_image;
    pub mod settings;
}

pub mod clustering {
    pub mod domain {
        pub mod face_clusterer;
        pub mod person_cluster;
    }
    pub mod infrastructure;
}

pub mod search {
    pub mod domain {
        pub mod image_ranker;
        pub mod search_query;
    }
    pub mod infrastructure;
}

pub mod events {
    pub mod domain {
        pub mod event;
        pub mod event_namer;
        pub mod event_segmenter;
    }
}

pub mod collage {
    pub mod domain {
        pub mod collage_layout;
        pub mod collage_planner;
    }
}

pub mod pipeline {
    pub mod analysis_logger;
    pub mod analyze_gallery_use_case;
}
