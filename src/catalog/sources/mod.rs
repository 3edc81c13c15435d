mod mangadex;

pub use mangadex::MangaDex;
