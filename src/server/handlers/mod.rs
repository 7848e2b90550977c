pub mod assignments;
pub mod health;
pub mod projects;
pub mod staff;
pub mod table_items;
pub mod work_items;
