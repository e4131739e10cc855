pub mod bto;
