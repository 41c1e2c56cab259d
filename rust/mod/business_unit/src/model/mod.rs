mod business_unit;
mod store;
mod update;
mod view;

pub use business_unit::*;
pub use store::*;
pub use update::*;
pub use view::*;
