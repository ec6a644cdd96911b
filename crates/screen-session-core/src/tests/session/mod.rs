mod buffer;
mod clock;
