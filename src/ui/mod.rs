mod app;
mod modal;
mod pager;
mod theme;
mod views;

pub use app::ShuukanApp;
