pub mod projection;
pub use projection::{lat_y, lng_x, x_lng, y_lat};
