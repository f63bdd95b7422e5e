//! A modem bank answering calls on a TCP port.
//!
//! Every accepted TCP connection is a telephone line to one modem and served by its own thread.
//! Datagrams that the callers send are collected by a router thread, which forwards them to the
//! caller owning the destination address or, if configured, to a TUN device. Datagrams read from
//! the TUN device take the same way.
#![deny(unsafe_code)]

pub mod config;
mod tun;

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpListener, TcpStream};
use std::sync::{mpsc, Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use dialup::layer::hayes::ResultCode;
use dialup::layer::ip::Pool;
use dialup::layer::Error;
use dialup::modem::{self, Connection, Registry};
use dialup::nic::{Network, Transport};

pub use config::Config;
use tun::Tun;

/// Largest datagram read from the TUN device.
const TUN_BUFFER: usize = 1 << 16;

/// The shortest read timeout, a zero guard time still waits this long.
const MIN_TIMEOUT: Duration = Duration::from_millis(20);

/// A call and the socket of its caller.
struct Session {
    connection: Connection,
    socket: Socket,
}

/// The writing half of a caller's socket.
struct Socket(TcpStream);

/// The way from a connection to the router.
#[derive(Clone)]
struct Uplink(mpsc::Sender<Vec<u8>>);

type Sessions = Registry<Arc<Mutex<Session>>>;

impl Transport for Socket {
    fn transmit(&mut self, bytes: &[u8]) {
        if let Err(err) = self.0.write_all(bytes) {
            debug!("write to caller failed: {}", err);
        }
    }
}

impl Network for Uplink {
    fn deliver(&mut self, datagram: &[u8]) {
        if self.0.send(datagram.to_vec()).is_err() {
            warn!("router is gone, dropped datagram");
        }
    }
}

/// Run the modem bank until the listener fails.
pub fn run(config: Config) -> io::Result<()> {
    config.validate().map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;

    let pool = Pool::new(config.subnet, config.gateway()).map_err(invalid_input)?;
    let pool = Arc::new(pool);
    let sessions = Arc::new(Mutex::new(Registry::with_capacity(pool.available())));
    let (uplink, datagrams) = mpsc::channel();

    let tun = match &config.tun {
        Some(name) => {
            let tun = Arc::new(Tun::open(name)?);
            info!("attached to {}", tun.name());
            let reader = Arc::clone(&tun);
            let uplink = Uplink(uplink.clone());
            thread::spawn(move || read_tun(&reader, uplink));
            Some(tun)
        },
        None => None,
    };

    {
        let sessions = Arc::clone(&sessions);
        thread::spawn(move || route(&sessions, tun.as_ref().map(Arc::as_ref), datagrams));
    }

    let listener = TcpListener::bind(config.listen)?;
    info!("listening on {}, leasing from {}", config.listen, pool);

    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(err) => {
                warn!("accept failed: {}", err);
                continue;
            },
        };

        let modem = config.modem(rand::random());
        let pool = Arc::clone(&pool);
        let sessions = Arc::clone(&sessions);
        let uplink = Uplink(uplink.clone());
        thread::spawn(move || {
            if let Err(err) = serve(stream, &modem, &pool, &sessions, uplink) {
                info!("call ended with error: {}", err);
            }
        });
    }

    Ok(())
}

/// Serve one caller until it disconnects.
fn serve(
    stream: TcpStream,
    config: &modem::Config,
    pool: &Arc<Pool>,
    sessions: &Mutex<Sessions>,
    mut uplink: Uplink,
) -> io::Result<()> {
    let peer = stream.peer_addr()?;
    let connection = match Connection::new(config, pool) {
        Ok(connection) => connection,
        Err(Error::Exhausted) => {
            warn!("{}: no address left, refusing", peer);
            let mut socket = Socket(stream);
            socket.transmit(format!("\r\n{}\r\n", ResultCode::NoDialtone).as_bytes());
            return socket.0.shutdown(Shutdown::Both);
        },
        Err(err) => return Err(invalid_input(err)),
    };

    let address = connection.address();
    let session = Arc::new(Mutex::new(Session {
        connection,
        socket: Socket(stream.try_clone()?),
    }));
    let key = lock(sessions)
        .insert(address, Arc::clone(&session))
        .map_err(invalid_input)?;
    info!("{}: connected, leased {}", peer, address);

    let result = pump(&stream, &session, &mut uplink);

    lock(sessions).remove(key);
    info!("{}: disconnected, releasing {}", peer, address);
    result
}

/// Feed received bytes to the modem, and tell it about pauses.
fn pump(mut stream: &TcpStream, session: &Mutex<Session>, uplink: &mut Uplink) -> io::Result<()> {
    let mut buffer = [0; 4096];
    loop {
        let timeout = lock(session).connection.guard_time().max(MIN_TIMEOUT);
        stream.set_read_timeout(Some(timeout))?;

        match stream.read(&mut buffer) {
            Ok(0) => return Ok(()),
            Ok(len) => {
                let mut session = lock(session);
                let Session { connection, socket } = &mut *session;
                connection.receive(&buffer[..len], socket, uplink);
            },
            Err(ref err) if err.kind() == io::ErrorKind::WouldBlock
                || err.kind() == io::ErrorKind::TimedOut =>
            {
                let mut session = lock(session);
                let Session { connection, socket } = &mut *session;
                connection.idle(Instant::now(), socket, uplink);
            },
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
            Err(err) => return Err(err),
        }
    }
}

/// Forward datagrams to the caller owning their destination.
fn route(sessions: &Mutex<Sessions>, tun: Option<&Tun>, datagrams: mpsc::Receiver<Vec<u8>>) {
    for datagram in datagrams {
        let target = {
            let sessions = lock(sessions);
            sessions.route(&datagram)
                .map(|key| sessions.get(key).cloned())
        };

        match target {
            Ok(Some(session)) => {
                let mut session = lock(&session);
                let Session { connection, socket } = &mut *session;
                if let Err(err) = connection.send_datagram(&datagram, socket) {
                    debug!("datagram for {} dropped: {}", connection.address(), err);
                }
            },
            Ok(None) => debug!("datagram for a closed call dropped"),
            Err(Error::Unreachable) => match tun {
                Some(tun) => {
                    if let Err(err) = tun.send(&datagram) {
                        warn!("write to {} failed: {}", tun.name(), err);
                    }
                },
                None => debug!("datagram without route dropped"),
            },
            Err(err) => debug!("datagram dropped: {}", err),
        }
    }
}

/// Pass datagrams from the TUN device to the router.
fn read_tun(tun: &Tun, mut uplink: Uplink) {
    let mut buffer = vec![0; TUN_BUFFER];
    loop {
        match tun.recv(&mut buffer) {
            Ok(len) => uplink.deliver(&buffer[..len]),
            Err(ref err) if err.kind() == io::ErrorKind::Interrupted => (),
            Err(err) => {
                warn!("read from {} failed: {}", tun.name(), err);
                return;
            },
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn invalid_input(err: Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}
