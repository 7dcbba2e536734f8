pub mod category_service;
pub mod category_tree;
pub mod material_filter;
pub mod material_service;
pub mod saga;
pub mod storage;
pub mod tutor;
pub mod view_cache;
