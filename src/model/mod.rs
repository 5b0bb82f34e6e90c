pub mod analytics;
pub mod customer;
pub mod daily_sales;
pub mod group;
pub mod group_role;
pub mod menu;
pub mod menu_role;
pub mod operasional;
pub mod product;
pub mod service;
pub mod staff;
pub mod staff_level;
pub mod transaction;
pub mod transaction_item;
pub mod user;
