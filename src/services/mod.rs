//! External capabilities: filename guessing and transcoding.

pub mod ffmpeg;
pub mod guesser;
