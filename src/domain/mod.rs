pub mod money;
pub mod product;
pub mod sale;
pub mod cart;

pub use money::*;
pub use product::*;
pub use sale::*;
pub use cart::*;
