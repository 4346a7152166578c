pub mod interpret;

pub use interpret::{argmax, classify, interpret, softmax, Classification, Prediction};
