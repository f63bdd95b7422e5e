#![allow(unsafe_code)]
//! A Linux TUN device carrying raw IPv4 datagrams.
use std::ffi::CString;
use std::io;

static TUN_PATH: &[u8] = b"/dev/net/tun\0";

const TUNSETIFF: libc::Ioctl = 0x400454CA;
const IFF_TUN: libc::c_short = 0x0001;
const IFF_NO_PI: libc::c_short = 0x1000;

/// An open TUN device.
///
/// Reads block until a datagram is available. Reading and writing may happen concurrently from
/// different threads.
#[derive(Debug)]
pub struct Tun {
    fd: libc::c_int,
    name: String,
}

/// The `ifreq` of `TUNSETIFF`: the interface name and its flags.
#[repr(C)]
struct Request {
    name: [libc::c_char; libc::IF_NAMESIZE],
    flags: libc::c_short,
    /// The rest of the kernel's union.
    _pad: [u8; 22],
}

impl Tun {
    /// Attach to the named device, creating it if permitted.
    pub fn open(name: &str) -> io::Result<Tun> {
        let c_name = CString::new(name)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))?;
        let bytes = c_name.as_bytes_with_nul();
        if bytes.len() > libc::IF_NAMESIZE {
            return Err(io::Error::new(io::ErrorKind::InvalidInput, "interface name too long"));
        }

        let fd = unsafe {
            libc::open(TUN_PATH.as_ptr() as *const libc::c_char, libc::O_RDWR)
        };
        if fd == -1 {
            return Err(io::Error::last_os_error());
        }

        let mut request = Request {
            name: [0; libc::IF_NAMESIZE],
            flags: IFF_TUN | IFF_NO_PI,
            _pad: [0; 22],
        };
        for (slot, &byte) in request.name.iter_mut().zip(bytes) {
            *slot = byte as libc::c_char;
        }

        let res = unsafe { libc::ioctl(fd, TUNSETIFF, &mut request as *mut Request) };
        if res == -1 {
            let err = io::Error::last_os_error();
            unsafe { libc::close(fd); }
            return Err(err);
        }

        Ok(Tun {
            fd,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receive a single datagram into the buffer.
    pub fn recv(&self, buffer: &mut [u8]) -> io::Result<usize> {
        let len = unsafe {
            libc::read(self.fd, buffer.as_mut_ptr() as *mut libc::c_void, buffer.len())
        };
        if len < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(len as usize)
    }

    /// Send a single datagram.
    pub fn send(&self, datagram: &[u8]) -> io::Result<usize> {
        let len = unsafe {
            libc::write(self.fd, datagram.as_ptr() as *const libc::c_void, datagram.len())
        };
        if len < 0 {
            return Err(io::Error::last_os_error());
        }
        Ok(len as usize)
    }
}

impl Drop for Tun {
    fn drop(&mut self) {
        unsafe { libc::close(self.fd); }
    }
}
