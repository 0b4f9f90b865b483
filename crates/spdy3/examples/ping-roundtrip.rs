//! Ping round trip over a Unix socket pair.
//!
//! Run with:
//!   cargo run --example ping-roundtrip
//!
//! One thread answers PINGs the way a SPDY endpoint would; the main thread
//! sends a few and reports the echoed ids, then says GOAWAY.

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::thread;

    use spdy3::frame::{Frame, FrameError, Framer, GoAway, Ping};

    let (client, server) = UnixStream::pair()?;

    let responder = thread::spawn(move || -> Result<usize, FrameError> {
        let mut framer = Framer::new(server);
        let mut answered = 0;
        loop {
            match framer.read_frame()? {
                Frame::Ping(ping) => {
                    framer.write_frame(&Frame::Ping(ping))?;
                    answered += 1;
                }
                Frame::GoAway(_) => return Ok(answered),
                other => eprintln!("ignoring {}", other.frame_type()),
            }
        }
    });

    let mut framer = Framer::new(client);
    // Client-initiated ping ids are odd.
    for id in [1u32, 3, 5] {
        framer.write_frame(&Frame::Ping(Ping { id }))?;
        let reply = framer.read_frame()?;
        eprintln!("sent ping {id}, got {reply:?}");
    }
    framer.write_frame(&Frame::GoAway(GoAway {
        last_good_stream_id: 0,
        status_code: 0,
    }))?;

    let answered = responder
        .join()
        .map_err(|_| "responder thread panicked")??;
    eprintln!("responder answered {answered} pings");
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("ping-roundtrip needs Unix sockets");
}
