//! Message decoding: `.eml` files → fully decoded [`Message`](crate::model::message::Message)s.

pub mod eml;
