//! Answer dial-up calls on a TCP port.
//!
//! Each caller talks to its own emulated Hayes modem, dials any number and negotiates PPP. Set
//! `RUST_LOG` to see the calls, for example `RUST_LOG=info`. Call example:
//!
//! * `dialup-server --listen 127.0.0.1:5555 --subnet 10.0.0.0/24 --dns 10.0.0.1 --tun ppp0`
use dialup_server::Config;

fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_args();
    dialup_server::run(config)
}
