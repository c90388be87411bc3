pub mod alive;
