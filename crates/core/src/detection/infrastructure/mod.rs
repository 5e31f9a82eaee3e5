pub mod cascade_face_detector;
pub mod cascade_loader;
pub mod detector_config;
pub mod executor_factory;
pub mod threaded_scan_executor;
