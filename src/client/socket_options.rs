//! Socket options applied to each client connection.

use std::{io, time::Duration};

use socket2::{SockRef, TcpKeepalive};
use tokio::net::TcpSocket;

/// Socket options applied before connecting to the aggregation server.
///
/// Unset options keep the operating system defaults.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use betwire::client::SocketOptions;
///
/// let options = SocketOptions::default()
///     .nodelay(true)
///     .keepalive(Some(Duration::from_secs(30)));
/// assert_ne!(options, SocketOptions::default());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SocketOptions {
    nodelay: Option<bool>,
    keepalive: Option<KeepAliveSetting>,
    linger: Option<LingerSetting>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum KeepAliveSetting {
    Disabled,
    Idle(Duration),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LingerSetting {
    Disabled,
    Duration(Duration),
}

impl SocketOptions {
    /// Configure `TCP_NODELAY`.
    #[must_use]
    pub fn nodelay(mut self, enabled: bool) -> Self {
        self.nodelay = Some(enabled);
        self
    }

    /// Configure `SO_KEEPALIVE` with the given idle time, or disable it.
    #[must_use]
    pub fn keepalive(mut self, idle: Option<Duration>) -> Self {
        self.keepalive = Some(idle.map_or(KeepAliveSetting::Disabled, KeepAliveSetting::Idle));
        self
    }

    /// Configure `SO_LINGER`.
    #[must_use]
    pub fn linger(mut self, duration: Option<Duration>) -> Self {
        self.linger = Some(duration.map_or(LingerSetting::Disabled, LingerSetting::Duration));
        self
    }

    /// Return the configured `TCP_NODELAY` value, if any.
    #[must_use]
    pub const fn nodelay_value(&self) -> Option<bool> { self.nodelay }

    pub(crate) fn apply(&self, socket: &TcpSocket) -> io::Result<()> {
        if let Some(enabled) = self.nodelay {
            socket.set_nodelay(enabled)?;
        }
        match self.keepalive {
            Some(KeepAliveSetting::Idle(idle)) => {
                socket.set_keepalive(true)?;
                SockRef::from(socket).set_tcp_keepalive(&TcpKeepalive::new().with_time(idle))?;
            }
            Some(KeepAliveSetting::Disabled) => socket.set_keepalive(false)?,
            None => {}
        }
        match self.linger {
            Some(LingerSetting::Duration(duration)) => socket.set_linger(Some(duration))?,
            Some(LingerSetting::Disabled) => socket.set_linger(None)?,
            None => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use socket2::SockRef;
    use tokio::net::TcpSocket;

    use super::SocketOptions;

    #[tokio::test]
    async fn options_reach_the_socket() {
        let socket = TcpSocket::new_v4().expect("create socket");
        SocketOptions::default()
            .nodelay(true)
            .keepalive(Some(Duration::from_secs(30)))
            .apply(&socket)
            .expect("apply options");

        assert!(socket.nodelay().expect("read nodelay"));
        assert!(SockRef::from(&socket).keepalive().expect("read keepalive"));
    }

    #[tokio::test]
    async fn unset_options_are_left_alone() {
        let socket = TcpSocket::new_v4().expect("create socket");
        let before = socket.nodelay().expect("read nodelay");
        SocketOptions::default().apply(&socket).expect("apply options");
        assert_eq!(socket.nodelay().expect("read nodelay"), before);
    }
}
