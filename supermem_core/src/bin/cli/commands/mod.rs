pub mod check;
pub mod dictionaries;
pub mod languages;
