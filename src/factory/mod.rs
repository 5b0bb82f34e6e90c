pub mod customer;
pub mod group;
pub mod menu;
pub mod product;
pub mod service;
pub mod staff;
pub mod staff_level;
pub mod user;
