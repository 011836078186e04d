mod handshake;
mod instance_info;
mod port_range;
