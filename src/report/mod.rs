pub mod html;
pub mod output;
