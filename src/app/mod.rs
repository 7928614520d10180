mod controller;

pub use controller::{Dashboard, PassOutput};
