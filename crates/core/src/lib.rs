//! Haar cascade face detection: grayscale conversion, integral images,
//! attentional cascade evaluation and multi-scale window scanning.

pub mod shared {
    pub mod constants;
    pub mod error;
    pub mod frame;
    pub mod region;
}

pub mod detection {
    pub mod domain {
        pub mod cascade_evaluator;
        pub mod cascade_model;
        pub mod cascade_observer;
        pub mod detection_collector;
        pub mod detection_window;
        pub mod face_detector;
        pub mod grayscale;
        pub mod integral_image;
        pub mod scale_scanner;
        pub mod scan_executor;
    }
    pub mod infrastructure;
}

pub mod imaging {
    pub mod domain {
        pub mod frame_annotator;
        pub mod image_reader;
        pub mod image_writer;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod detect_image_use_case;
}
