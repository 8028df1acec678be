pub mod gauge_bar;
pub mod status_dot;
