pub mod access;
#[cfg(test)]
mod access_test;
pub mod analytics;
#[cfg(test)]
mod analytics_test;
pub mod auth;
#[cfg(test)]
mod auth_test;
pub mod common;
pub mod customer;
pub mod daily_sales;
pub mod group;
#[cfg(test)]
mod group_test;
pub mod health;
#[cfg(test)]
mod health_test;
pub mod menu;
pub mod menu_role;
#[cfg(test)]
mod menu_test;
pub mod operasional;
pub mod product;
#[cfg(test)]
mod product_test;
pub mod service;
pub mod staff;
pub mod staff_level;
#[cfg(test)]
mod staff_test;
pub mod transaction;
#[cfg(test)]
mod transaction_test;
pub mod user;
#[cfg(test)]
mod user_test;
pub mod webhook;
