//! Live reload over WebSocket.
//!
//! Pages served in development carry a small client script that connects to
//! the hub on `reload_port`. After a task finishes, the hub broadcasts either
//! `reload` (full page) or `css` (re-fetch stylesheets in place).

use crate::{log, pipeline::Task};
use anyhow::{Context, Result};
use parking_lot::Mutex;
use std::{
    net::{IpAddr, SocketAddr, TcpListener, TcpStream},
    sync::Arc,
    thread,
    time::Duration,
};
use tungstenite::{Message, WebSocket};

/// Upper bound for a single send to one browser.
const CLIENT_WRITE_TIMEOUT: Duration = Duration::from_millis(500);

/// Browser-side client, `{port}` is replaced with the hub port.
const CLIENT_TEMPLATE: &str = r#"<script>
(function () {
  var ws = new WebSocket("ws://" + location.hostname + ":{port}");
  ws.onmessage = function (event) {
    if (event.data === "css") {
      document.querySelectorAll('link[rel="stylesheet"]').forEach(function (link) {
        var url = new URL(link.href);
        url.searchParams.set("t", Date.now());
        link.href = url.toString();
      });
    } else {
      location.reload();
    }
  };
})();
</script>"#;

/// What connected browsers should refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadKind {
    Page,
    Css,
}

impl ReloadKind {
    /// Reload triggered by a finished task. Clean and Manifest produce
    /// nothing the browser loads.
    pub fn after(task: Task) -> Option<Self> {
        match task {
            Task::Clean | Task::Manifest => None,
            Task::Styles => Some(Self::Css),
            Task::Fonts | Task::Html | Task::Scripts | Task::Images => Some(Self::Page),
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Page => "reload",
            Self::Css => "css",
        }
    }
}

/// Sink for reload notifications. Delivery is best effort.
pub trait Reload: Send + Sync {
    fn reload(&self, kind: ReloadKind);
}

/// Used by one-shot builds.
pub struct NoopReload;

impl Reload for NoopReload {
    fn reload(&self, _kind: ReloadKind) {}
}

/// WebSocket broadcast hub.
pub struct LiveReload {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    addr: SocketAddr,
}

impl LiveReload {
    /// Bind the hub and accept clients on a background thread.
    pub fn start(interface: IpAddr, port: u16) -> Result<Self> {
        let listener = TcpListener::bind(SocketAddr::new(interface, port))
            .with_context(|| format!("Failed to bind live reload port {port}"))?;
        let addr = listener.local_addr()?;
        let clients = Arc::new(Mutex::new(Vec::new()));

        let accepted = Arc::clone(&clients);
        thread::spawn(move || accept_loop(listener, accepted));

        log!("reload"; "ws://{addr}");
        Ok(Self { clients, addr })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// `html` with the client script inserted before `</body>`.
    pub fn inject_client(&self, html: &str) -> String {
        inject_client(html, self.port())
    }
}

impl Reload for LiveReload {
    fn reload(&self, kind: ReloadKind) {
        // The lock is not held while sending.
        let mut sending = std::mem::take(&mut *self.clients.lock());
        sending.retain_mut(|ws| match ws.send(Message::text(kind.message())) {
            Ok(()) => true,
            Err(e) => {
                log!("reload"; "client dropped: {e}");
                false
            }
        });

        let mut clients = self.clients.lock();
        let sent = sending.len();
        sending.append(&mut clients);
        *clients = sending;
        log!("reload"; "{} ({sent} client(s))", kind.message());
    }
}

fn accept_loop(listener: TcpListener, clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>) {
    for stream in listener.incoming() {
        let stream = match stream {
            Ok(stream) => stream,
            Err(e) => {
                log!("reload"; "accept failed: {e}");
                continue;
            }
        };
        if let Err(e) = stream.set_write_timeout(Some(CLIENT_WRITE_TIMEOUT)) {
            log!("reload"; "client setup failed: {e}");
            continue;
        }
        match tungstenite::accept(stream) {
            Ok(ws) => clients.lock().push(ws),
            Err(e) => log!("reload"; "handshake failed: {e}"),
        }
    }
}

fn inject_client(html: &str, port: u16) -> String {
    let script = CLIENT_TEMPLATE.replace("{port}", &port.to_string());
    let at = html.rfind("</body>").or_else(|| html.rfind("</html>"));

    match at {
        Some(i) => format!("{}{script}{}", &html[..i], &html[i..]),
        None => format!("{html}{script}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        net::Ipv4Addr,
        time::{Duration, Instant},
    };

    #[test]
    fn test_reload_kind_after_task() {
        assert_eq!(ReloadKind::after(Task::Styles), Some(ReloadKind::Css));
        assert_eq!(ReloadKind::after(Task::Html), Some(ReloadKind::Page));
        assert_eq!(ReloadKind::after(Task::Clean), None);
        assert_eq!(ReloadKind::Css.message(), "css");
        assert_eq!(ReloadKind::Page.message(), "reload");
    }

    #[test]
    fn test_inject_before_body_end() {
        let html = "<html><body><p>hi</p></body></html>";
        let out = inject_client(html, 35729);

        let script = out.find("<script>").unwrap();
        assert!(script > out.find("<p>hi</p>").unwrap());
        assert!(script < out.find("</body>").unwrap());
        assert!(out.contains(":35729"));
    }

    #[test]
    fn test_inject_without_body() {
        assert!(inject_client("<p>fragment</p>", 1).ends_with("</script>"));
        let out = inject_client("<html><p>x</p></html>", 1);
        assert!(out.ends_with("</script></html>"));
    }

    #[test]
    fn test_broadcast_to_client() {
        let hub = LiveReload::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let (mut client, _) = tungstenite::connect(format!("ws://127.0.0.1:{}", hub.port())).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while hub.clients.lock().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(hub.clients.lock().len(), 1);

        hub.reload(ReloadKind::Css);
        let message = client.read().unwrap();
        assert_eq!(message.to_text().unwrap(), "css");

        let clients = hub.clients.lock();
        assert_eq!(clients.len(), 1);
        assert_eq!(
            clients[0].get_ref().write_timeout().unwrap(),
            Some(CLIENT_WRITE_TIMEOUT)
        );
    }

    #[test]
    fn test_closed_client_is_dropped() {
        let hub = LiveReload::start(IpAddr::V4(Ipv4Addr::LOCALHOST), 0).unwrap();
        let (client, _) = tungstenite::connect(format!("ws://127.0.0.1:{}", hub.port())).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while hub.clients.lock().is_empty() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
        }
        drop(client);

        // The first send after a close may still be buffered by the OS.
        for _ in 0..20 {
            hub.reload(ReloadKind::Page);
            if hub.clients.lock().is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
        assert!(hub.clients.lock().is_empty());
    }

    #[test]
    fn test_noop_reload() {
        NoopReload.reload(ReloadKind::Page);
    }
}
