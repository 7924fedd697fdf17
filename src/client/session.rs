use std::{io, net::SocketAddr, path::Path};
use tokio::{
    fs::OpenOptions,
    io::{AsyncReadExt, AsyncWriteExt, BufReader},
    net::{
        tcp::{OwnedReadHalf, OwnedWriteHalf},
        TcpStream, ToSocketAddrs,
    },
};

use crate::{
    error::{Error, Result},
    protocol::{
        parse_list, parse_passive, Command, DirEntry, Reply, CLOSING_CONTROL, COMMAND_OK,
        COMMAND_SUPERFLUOUS, FILE_ACTION_OK, FILE_STATUS, LOGGED_IN, NEED_PASSWORD, PASSIVE_MODE,
        SERVICE_READY, TRANSFER_COMPLETE, TRANSFER_STARTING,
    },
};

/// Implements the control connection of an FTP client in request-response format.
/// Data transfers always use passive mode and a fresh data connection.
pub struct FtpSession {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
}

impl FtpSession {
    /// Opens the control connection and waits for the greeting
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();

        let mut session = Self {
            reader: BufReader::new(reader),
            writer,
            peer,
        };

        let _ = session.read_reply().await?.expect(&[SERVICE_READY])?;
        Ok(session)
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let reply = Reply::read(&mut self.reader).await?;
        debug!("< {} {}", reply.code, reply.message());
        Ok(reply)
    }

    async fn send(&mut self, command: Command<'_>) -> Result<Reply> {
        debug!("> {:?}", command);
        self.writer.write_all(&command.encode()?).await?;
        self.read_reply().await
    }

    async fn execute(&mut self, command: Command<'_>, expected: &[u16]) -> Result<Reply> {
        self.send(command).await?.expect(expected)
    }

    /// Authenticates with `USER` and, when asked for it, `PASS`
    pub async fn login(&mut self, user: &str, password: &str) -> Result<()> {
        let reply = self.send(Command::User(user)).await?;
        match reply.code {
            LOGGED_IN => Ok(()),
            NEED_PASSWORD => self
                .execute(Command::Pass(password), &[LOGGED_IN, COMMAND_SUPERFLUOUS])
                .await
                .map(|_| ()),
            _ => Err(reply.into()),
        }
    }

    /// Switches the session to binary transfers
    pub async fn binary(&mut self) -> Result<()> {
        self.execute(Command::Binary, &[COMMAND_OK]).await.map(|_| ())
    }

    pub async fn cwd(&mut self, path: &str) -> Result<()> {
        self.execute(Command::Cwd(path), &[FILE_ACTION_OK, COMMAND_OK])
            .await
            .map(|_| ())
    }

    /// Queries the size of a remote file in bytes
    pub async fn size(&mut self, path: &str) -> Result<u64> {
        let reply = self.execute(Command::Size(path), &[FILE_STATUS]).await?;
        let message = reply.message();
        message
            .trim()
            .parse()
            .map_err(|_| Error::BadReply(format!("invalid size {message:?}")))
    }

    async fn passive(&mut self) -> Result<TcpStream> {
        let reply = self.execute(Command::Pasv, &[PASSIVE_MODE]).await?;
        let mut addr = SocketAddr::V4(parse_passive(&reply.message())?);

        // servers behind NAT sometimes announce 0.0.0.0
        if addr.ip().is_unspecified() {
            addr.set_ip(self.peer.ip());
        }

        debug!("opening data connection to {}", addr);
        Ok(TcpStream::connect(addr).await?)
    }

    /// Lists a remote directory
    pub async fn list(&mut self, path: &str) -> Result<Vec<DirEntry>> {
        let mut data = self.passive().await?;
        let _ = self.execute(Command::List(path), TRANSFER_STARTING).await?;

        let mut body = Vec::new();
        let _ = data.read_to_end(&mut body).await?;
        drop(data);

        let _ = self.read_reply().await?.expect(TRANSFER_COMPLETE)?;
        Ok(parse_list(&String::from_utf8_lossy(&body)))
    }

    /// Downloads a remote file into `destination`, which must not exist yet.
    /// Returns the number of bytes written.
    pub async fn retrieve(&mut self, path: &str, destination: &Path) -> Result<u64> {
        let mut data = self.passive().await?;
        let _ = self.execute(Command::Retr(path), TRANSFER_STARTING).await?;

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(destination)
            .await
            .map_err(|err| match err.kind() {
                io::ErrorKind::AlreadyExists => Error::DestinationExists(destination.to_owned()),
                _ => err.into(),
            })?;
        let written = tokio::io::copy(&mut data, &mut file).await?;
        file.flush().await?;
        drop(data);

        let _ = self.read_reply().await?.expect(TRANSFER_COMPLETE)?;
        Ok(written)
    }

    /// Ends the session politely. The connection is closed when the session is dropped.
    pub async fn quit(&mut self) -> Result<()> {
        self.execute(Command::Quit, &[CLOSING_CONTROL])
            .await
            .map(|_| ())
    }
}
