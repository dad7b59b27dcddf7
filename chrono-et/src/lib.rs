pub mod et;

pub use et::Et;
pub use et::EtOffset;
