pub mod app_factory;
