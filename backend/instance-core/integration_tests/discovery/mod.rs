mod allocator;
mod handshake;
mod probe;
