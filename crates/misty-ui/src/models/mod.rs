pub mod lookup_model;
