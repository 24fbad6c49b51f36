// Entity Models
//
// A taxpayer is identified by its tax number; the title is a value that can
// change under the same identity.

pub mod taxpayer;

pub use taxpayer::TaxPayer;
