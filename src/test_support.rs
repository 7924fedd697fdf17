//! In-process servers for tests.
//!
//! [`MemoryServer`] implements [`Connector`] directly and records every operation.
//! [`FakeServer`] speaks just enough FTP over `127.0.0.1` to exercise [`crate::client::FtpSession`].

use std::{
    net::SocketAddr,
    path::Path,
    sync::{Arc, Mutex},
};
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{tcp::OwnedWriteHalf, TcpListener},
    task::JoinHandle,
};

use crate::{
    client::{Connector, Credentials, Endpoint, RemoteFs},
    error::{Error, Result},
    protocol::DirEntry,
};

pub const USER: &str = "demo";
pub const PASSWORD: &str = "password";

/// Remote tree: file paths with contents, `None` marks an empty directory
type Tree = Vec<(String, Option<Vec<u8>>)>;

fn resolve(cwd: &str, path: &str) -> String {
    let joined = if path.starts_with('/') {
        path.to_owned()
    } else {
        format!("{cwd}/{path}")
    };

    joined
        .split('/')
        .filter(|part| !part.is_empty() && *part != ".")
        .collect::<Vec<_>>()
        .join("/")
}

fn dir_exists(tree: &Tree, dir: &str) -> bool {
    let prefix = format!("{dir}/");
    dir.is_empty()
        || tree
            .iter()
            .any(|(path, content)| (path == dir && content.is_none()) || path.starts_with(&prefix))
}

fn file_content<'a>(tree: &'a Tree, path: &str) -> Option<&'a [u8]> {
    tree.iter()
        .find(|(p, _)| p == path)
        .and_then(|(_, content)| content.as_deref())
}

fn children(tree: &Tree, dir: &str) -> Vec<DirEntry> {
    let prefix = if dir.is_empty() {
        String::new()
    } else {
        format!("{dir}/")
    };

    let mut entries: Vec<DirEntry> = vec![];
    for (path, content) in tree {
        let Some(rest) = path.strip_prefix(&prefix) else {
            continue;
        };
        let entry = match (rest.split_once('/'), content) {
            (Some((name, _)), _) => DirEntry::directory(name),
            (None, None) => DirEntry::directory(rest),
            (None, Some(content)) => DirEntry::file(rest, content.len() as u64),
        };
        if !entries.iter().any(|e| e.name == entry.name) {
            entries.push(entry);
        }
    }

    entries
}

fn not_found(path: &str) -> Error {
    Error::Reply {
        code: 550,
        message: format!("{path}: No such file or directory"),
    }
}

#[derive(Default)]
struct MemoryState {
    tree: Tree,
    log: Vec<String>,
    connections: usize,
    fail_on: Option<String>,
}

impl MemoryState {
    fn record(&mut self, line: String) -> Result<()> {
        let failed = self.fail_on.as_deref() == Some(line.as_str());
        self.log.push(line);

        if failed {
            Err(Error::Reply {
                code: 451,
                message: "Requested action aborted".to_owned(),
            })
        } else {
            Ok(())
        }
    }
}

/// Remote filesystem kept in memory, accepting [`USER`] / [`PASSWORD`]
#[derive(Clone, Default)]
pub struct MemoryServer {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, path: &str, content: &[u8]) -> Self {
        self.add_file(path, content);
        self
    }

    pub fn directory(self, path: &str) -> Self {
        self.state.lock().unwrap().tree.push((path.to_owned(), None));
        self
    }

    /// Makes the operation recorded as `line` fail with `451`
    pub fn fail_on(self, line: &str) -> Self {
        self.state.lock().unwrap().fail_on = Some(line.to_owned());
        self
    }

    pub fn add_file(&self, path: &str, content: &[u8]) {
        self.state
            .lock()
            .unwrap()
            .tree
            .push((path.to_owned(), Some(content.to_vec())));
    }

    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new("memory", 21)
            .with_connector(self.clone())
            .with_credentials(|| Credentials::new(USER, PASSWORD))
    }

    /// Every operation so far, e.g. `LIST pub/a` or `RETR pub/a/1.nc`
    pub fn log(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn connections(&self) -> usize {
        self.state.lock().unwrap().connections
    }
}

#[async_trait]
impl Connector for MemoryServer {
    async fn connect(
        &self,
        _host: &str,
        _port: u16,
        credentials: &Credentials,
    ) -> Result<Box<dyn RemoteFs>> {
        let mut state = self.state.lock().unwrap();
        state.record("CONNECT".to_owned())?;

        if credentials != &Credentials::new(USER, PASSWORD) {
            return Err(Error::Reply {
                code: 530,
                message: "Login incorrect".to_owned(),
            });
        }

        state.connections += 1;
        Ok(Box::new(MemorySession {
            state: self.state.clone(),
            cwd: String::new(),
        }))
    }
}

struct MemorySession {
    state: Arc<Mutex<MemoryState>>,
    cwd: String,
}

#[async_trait]
impl RemoteFs for MemorySession {
    async fn change_dir(&mut self, path: &str) -> Result<()> {
        let resolved = resolve(&self.cwd, path);
        let mut state = self.state.lock().unwrap();
        state.record(format!("CWD {resolved}"))?;

        if !dir_exists(&state.tree, &resolved) {
            return Err(not_found(&resolved));
        }
        self.cwd = resolved;
        Ok(())
    }

    async fn list_dir(&mut self, path: &str) -> Result<Vec<DirEntry>> {
        let resolved = resolve(&self.cwd, path);
        let mut state = self.state.lock().unwrap();
        state.record(format!("LIST {resolved}"))?;

        if !dir_exists(&state.tree, &resolved) {
            return Err(not_found(&resolved));
        }
        Ok(children(&state.tree, &resolved))
    }

    async fn size(&mut self, path: &str) -> Result<u64> {
        let resolved = resolve(&self.cwd, path);
        let mut state = self.state.lock().unwrap();
        state.record(format!("SIZE {resolved}"))?;

        file_content(&state.tree, &resolved)
            .map(|content| content.len() as u64)
            .ok_or_else(|| not_found(&resolved))
    }

    async fn download(&mut self, remote: &str, local: &Path) -> Result<u64> {
        let resolved = resolve(&self.cwd, remote);
        let mut state = self.state.lock().unwrap();
        state.record(format!("RETR {resolved}"))?;

        let content = file_content(&state.tree, &resolved).ok_or_else(|| not_found(&resolved))?;
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(local)?;
        std::io::Write::write_all(&mut file, content)?;

        Ok(content.len() as u64)
    }

    async fn quit(&mut self) -> Result<()> {
        self.state.lock().unwrap().record("QUIT".to_owned())
    }
}

/// A minimal FTP server on `127.0.0.1` serving a fixed tree
pub struct FakeServer {
    user: String,
    password: String,
    tree: Tree,
    unspecified_passive: bool,
}

/// Handle to a started [`FakeServer`]; the server stops when it is dropped
pub struct RunningServer {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }
}

impl Drop for RunningServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl FakeServer {
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_owned(),
            password: password.to_owned(),
            tree: vec![],
            unspecified_passive: false,
        }
    }

    /// Announces `0,0,0,0` in `227` replies, like servers behind NAT do
    pub fn unspecified_passive(mut self) -> Self {
        self.unspecified_passive = true;
        self
    }

    pub fn file(mut self, path: &str, content: &[u8]) -> Self {
        self.tree.push((path.to_owned(), Some(content.to_vec())));
        self
    }

    pub async fn start(self) -> RunningServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = Arc::new(self);

        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let server = server.clone();
                let _ = tokio::spawn(async move {
                    let _ = server.serve(stream).await;
                });
            }
        });

        RunningServer { addr, task }
    }

    async fn serve(&self, stream: tokio::net::TcpStream) -> std::io::Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);
        let mut cwd = String::new();
        let mut data: Option<TcpListener> = None;

        reply(&mut writer, "220 fake server ready").await?;

        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await? == 0 {
                return Ok(());
            }

            let line = line.trim_end().to_owned();
            let (verb, arg) = line.split_once(' ').unwrap_or((line.as_str(), ""));

            match verb {
                "USER" if arg == self.user => reply(&mut writer, "331 Password required").await?,
                "USER" => reply(&mut writer, "530 Login incorrect").await?,
                "PASS" if arg == self.password => reply(&mut writer, "230 Logged in").await?,
                "PASS" => reply(&mut writer, "530 Login incorrect").await?,
                "TYPE" => reply(&mut writer, "200 Type set to I").await?,
                "CWD" => {
                    let resolved = resolve(&cwd, arg);
                    if dir_exists(&self.tree, &resolved) {
                        cwd = resolved;
                        reply(&mut writer, "250 Directory changed").await?;
                    } else {
                        reply(&mut writer, "550 No such directory").await?;
                    }
                }
                "SIZE" => match file_content(&self.tree, &resolve(&cwd, arg)) {
                    Some(content) => reply(&mut writer, &format!("213 {}", content.len())).await?,
                    None => reply(&mut writer, "550 No such file").await?,
                },
                "PASV" => {
                    let listener = TcpListener::bind("127.0.0.1:0").await?;
                    let port = listener.local_addr()?.port();
                    let host = if self.unspecified_passive {
                        "0,0,0,0"
                    } else {
                        "127,0,0,1"
                    };
                    data = Some(listener);
                    reply(
                        &mut writer,
                        &format!(
                            "227 Entering Passive Mode ({},{},{}).",
                            host,
                            port >> 8,
                            port & 0xff
                        ),
                    )
                    .await?;
                }
                "LIST" => {
                    let resolved = resolve(&cwd, arg);
                    let body: String = children(&self.tree, &resolved)
                        .iter()
                        .map(|entry| match entry.size {
                            Some(size) => format!(
                                "-rw-r--r--    1 ftp      ftp      {size:>8} Jan 01  2020 {}\r\n",
                                entry.name
                            ),
                            None => format!(
                                "drwxr-xr-x    2 ftp      ftp          4096 Jan 01  2020 {}\r\n",
                                entry.name
                            ),
                        })
                        .collect();
                    send_data(&mut writer, data.take(), body.as_bytes()).await?;
                }
                "RETR" => match file_content(&self.tree, &resolve(&cwd, arg)) {
                    Some(content) => send_data(&mut writer, data.take(), content).await?,
                    None => reply(&mut writer, "550 No such file").await?,
                },
                "QUIT" => {
                    reply(&mut writer, "221 Goodbye").await?;
                    return Ok(());
                }
                _ => reply(&mut writer, "502 Command not implemented").await?,
            }
        }
    }
}

async fn reply(writer: &mut OwnedWriteHalf, line: &str) -> std::io::Result<()> {
    writer.write_all(format!("{line}\r\n").as_bytes()).await
}

async fn send_data(
    writer: &mut OwnedWriteHalf,
    listener: Option<TcpListener>,
    body: &[u8],
) -> std::io::Result<()> {
    let Some(listener) = listener else {
        return reply(writer, "425 Use PASV first").await;
    };

    reply(writer, "150 Opening BINARY mode data connection").await?;
    let (mut conn, _) = listener.accept().await?;
    conn.write_all(body).await?;
    conn.shutdown().await?;
    drop(conn);

    reply(writer, "226 Transfer complete").await
}
