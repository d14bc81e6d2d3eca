mod line;

pub use self::line::{Line2, Line2d, Turn};
pub use cgmath::{Deg, Rad};

pub type Pnt2<T> = cgmath::Point2<T>;
pub type Pnt2d = Pnt2<f64>;
pub type Pnt3f = cgmath::Point3<f32>;

pub type Radf = Rad<f32>;
