// End-to-end checks of the command loop over an in-memory control
// connection and real loopback data connections.

#[cfg(test)]
mod tests {
    use crate::config::{AuthConfig, Config};
    use crate::constants::NATIVE_EOL;
    use crate::core_fs::{FileSystem, LocalFileSystem};
    use crate::core_ftpcommand::ftpcommand::Command;
    use crate::core_ftpcommand::handlers::{dispatch_command, initialize_command_handlers};
    use crate::core_network::network::run_session;
    use crate::core_transfer::TransferType;
    use crate::session::{AuthState, Session};
    use std::net::{IpAddr, Ipv4Addr};
    use std::path::PathBuf;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tokio::io::{
        split, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader, DuplexStream, ReadHalf,
        WriteHalf,
    };
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.server.listen_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
        config.auth = AuthConfig {
            username: "comp4621".to_string(),
            password: Some("network".to_string()),
            password_hash: None,
            anonymous: false,
        };
        config
    }

    fn test_session() -> (TempDir, Session) {
        session_on_port(0)
    }

    fn session_on_port(data_port: u16) -> (TempDir, Session) {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        let fs: Arc<dyn FileSystem> = Arc::new(LocalFileSystem::new(root));
        (dir, Session::new(fs, None, data_port))
    }

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    struct Client {
        root: PathBuf,
        reader: BufReader<ReadHalf<DuplexStream>>,
        writer: WriteHalf<DuplexStream>,
        task: JoinHandle<std::io::Result<()>>,
        _dir: TempDir,
    }

    impl Client {
        async fn connect() -> Self {
            Self::connect_on_port(0).await
        }

        async fn connect_on_port(data_port: u16) -> Self {
            let (dir, session) = session_on_port(data_port);
            let root = session.root_dir.clone();
            let config = test_config();

            let (client, server) = tokio::io::duplex(64 * 1024);
            let (server_read, server_write) = split(server);
            let task = tokio::spawn(async move {
                run_session(BufReader::new(server_read), server_write, &config, session).await
            });

            let (client_read, client_write) = split(client);
            let mut client = Self {
                root,
                reader: BufReader::new(client_read),
                writer: client_write,
                task,
                _dir: dir,
            };
            let greeting = client.reply().await;
            assert!(greeting.starts_with("220 "), "{}", greeting);
            client
        }

        async fn send(&mut self, line: &str) {
            self.writer
                .write_all(format!("{}\r\n", line).as_bytes())
                .await
                .unwrap();
        }

        /// Reads one complete reply, following `NNN-` continuation lines.
        async fn reply(&mut self) -> String {
            let mut reply = String::new();
            loop {
                let mut line = String::new();
                let n = self.reader.read_line(&mut line).await.unwrap();
                assert!(n > 0, "control connection closed, got so far: {:?}", reply);
                reply.push_str(&line);
                if line.len() >= 4 && line.as_bytes()[3] == b' ' {
                    return reply;
                }
            }
        }

        async fn command(&mut self, line: &str) -> String {
            self.send(line).await;
            self.reply().await
        }

        async fn login(&mut self) {
            assert!(self.command("USER comp4621").await.starts_with("331 "));
            assert!(self.command("PASS network").await.starts_with("230 "));
        }

        async fn passive(&mut self) -> TcpStream {
            self.passive_with_port().await.1
        }

        async fn passive_with_port(&mut self) -> (u16, TcpStream) {
            let reply = self.command("PASV").await;
            assert!(reply.starts_with("227 "), "{}", reply);
            let inner = &reply[reply.find('(').unwrap() + 1..reply.find(')').unwrap()];
            let fields: Vec<u16> = inner.split(',').map(|f| f.parse().unwrap()).collect();
            assert_eq!(&fields[..4], &[127, 0, 0, 1]);
            let port = fields[4] * 256 + fields[5];
            (port, TcpStream::connect(("127.0.0.1", port)).await.unwrap())
        }

        async fn extended_passive(&mut self) -> TcpStream {
            let reply = self.command("EPSV").await;
            assert!(reply.starts_with("229 "), "{}", reply);
            let port: u16 = reply
                .split("|||")
                .nth(1)
                .and_then(|rest| rest.split('|').next())
                .unwrap()
                .parse()
                .unwrap();
            TcpStream::connect(("127.0.0.1", port)).await.unwrap()
        }

        async fn store(&mut self, name: &str, contents: &[u8]) -> String {
            let mut data = self.passive().await;
            let reply = self.command(&format!("STOR {}", name)).await;
            if !reply.starts_with("150 ") {
                return reply;
            }
            data.write_all(contents).await.unwrap();
            data.shutdown().await.unwrap();
            self.reply().await
        }

        async fn retrieve(&mut self, name: &str) -> (String, Vec<u8>) {
            let mut data = self.passive().await;
            let reply = self.command(&format!("RETR {}", name)).await;
            assert!(reply.starts_with("150 "), "{}", reply);
            let mut received = Vec::new();
            data.read_to_end(&mut received).await.unwrap();
            (self.reply().await, received)
        }

        async fn quit(mut self) {
            assert!(self.command("QUIT").await.starts_with("221 "));
            self.task.await.unwrap().unwrap();
        }
    }

    async fn dispatch(session: &mut Session, line: &str) -> String {
        let config = test_config();
        let handlers = initialize_command_handlers::<Vec<u8>>();
        let mut out = Vec::new();
        dispatch_command(&mut out, &config, session, &handlers, &Command::parse(line))
            .await
            .unwrap();
        String::from_utf8(out).unwrap()
    }

    #[tokio::test]
    async fn login_and_directory_scenario() {
        let mut client = Client::connect().await;
        client.login().await;

        let root = client.root.display().to_string();
        assert_eq!(client.command("PWD").await, format!("257 \"{}\"\r\n", root));
        assert!(client.command("MKD sub1").await.starts_with("250 "));
        assert!(client.command("CWD sub1").await.starts_with("250 "));
        assert_eq!(
            client.command("PWD").await,
            format!("257 \"{}/sub1\"\r\n", root)
        );
        assert!(client.command("CWD ..").await.starts_with("250 "));
        assert_eq!(client.command("PWD").await, format!("257 \"{}\"\r\n", root));
        assert!(client.command("RMD sub1").await.starts_with("250 "));
        assert!(!client.root.join("sub1").exists());

        client.quit().await;
    }

    #[tokio::test]
    async fn pass_before_user_is_rejected() {
        let (_dir, mut session) = test_session();
        assert_eq!(dispatch(&mut session, "PASS x").await, "530 Not logged in\r\n");
        assert_eq!(session.auth, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn auth_state_never_regresses() {
        let (_dir, mut session) = test_session();

        assert!(dispatch(&mut session, "USER stranger").await.starts_with("530 "));
        assert_eq!(session.auth, AuthState::Unauthenticated);

        assert!(dispatch(&mut session, "USER comp4621").await.starts_with("331 "));
        assert!(dispatch(&mut session, "PASS wrong").await.starts_with("530 "));
        assert!(matches!(session.auth, AuthState::UsernameEntered { .. }));

        assert!(dispatch(&mut session, "PASS network").await.starts_with("230 "));
        assert!(session.auth.is_authenticated());

        assert_eq!(
            dispatch(&mut session, "USER comp4621").await,
            "530 User already logged in\r\n"
        );
        assert_eq!(
            dispatch(&mut session, "PASS network").await,
            "530 User already logged in\r\n"
        );
        assert!(session.auth.is_authenticated());
    }

    #[tokio::test]
    async fn invalid_type_keeps_previous_value() {
        let (_dir, mut session) = test_session();
        assert!(dispatch(&mut session, "TYPE i").await.starts_with("200 "));
        assert_eq!(session.transfer_type, TransferType::Binary);
        assert!(dispatch(&mut session, "TYPE Z").await.starts_with("504 "));
        assert_eq!(session.transfer_type, TransferType::Binary);
        assert!(dispatch(&mut session, "TYPE").await.starts_with("501 "));
        assert_eq!(session.transfer_type, TransferType::Binary);
    }

    #[tokio::test]
    async fn unknown_and_empty_commands() {
        let (_dir, mut session) = test_session();
        assert_eq!(dispatch(&mut session, "SITE WHO").await, "501 Unknown command\r\n");
        assert_eq!(dispatch(&mut session, "").await, "501 Unknown command\r\n");
        assert_eq!(session.auth, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn informational_commands() {
        let (_dir, mut session) = test_session();
        assert_eq!(dispatch(&mut session, "SYST").await, "215 UNIX Type: L8\r\n");
        let feat = dispatch(&mut session, "FEAT").await;
        assert!(feat.starts_with("211-"));
        assert!(feat.ends_with("211 END\r\n"));
        assert!(dispatch(&mut session, "NOOP").await.starts_with("200 "));
    }

    #[tokio::test]
    async fn mkd_and_rmd_validate_names() {
        let (_dir, mut session) = test_session();
        assert_eq!(dispatch(&mut session, "MKD ../evil").await, "550 Invalid name\r\n");
        assert_eq!(dispatch(&mut session, "XMKD .hidden").await, "550 Invalid name\r\n");
        assert!(dispatch(&mut session, "XMKD sub2").await.starts_with("250 "));
        assert!(dispatch(&mut session, "MKD sub2").await.starts_with("550 "));
        assert!(dispatch(&mut session, "RMD missing").await.starts_with("550 "));
        assert!(dispatch(&mut session, "XRMD sub2").await.starts_with("250 "));
    }

    #[tokio::test]
    async fn cwd_failures_leave_directory_unchanged() {
        let (_dir, mut session) = test_session();
        let before = session.current_dir.clone();
        assert!(dispatch(&mut session, "CWD missing").await.starts_with("550 "));
        assert!(dispatch(&mut session, "CWD ..").await.starts_with("550 "));
        assert!(dispatch(&mut session, "CDUP").await.starts_with("550 "));
        assert!(dispatch(&mut session, "CWD .").await.starts_with("250 "));
        assert_eq!(session.current_dir, before);
    }

    #[tokio::test]
    async fn transfers_need_a_data_connection() {
        let (_dir, mut session) = test_session();
        std::fs::write(session.root_dir.join("file.txt"), b"x").unwrap();

        assert!(dispatch(&mut session, "LIST").await.starts_with("425 "));
        assert!(dispatch(&mut session, "RETR file.txt").await.starts_with("425 "));
        assert!(dispatch(&mut session, "STOR new.txt").await.starts_with("425 "));
        assert!(!session.root_dir.join("new.txt").exists());

        assert!(dispatch(&mut session, "RETR absent.txt").await.starts_with("550 "));
        assert!(dispatch(&mut session, "STOR file.txt").await.starts_with("550 "));
        assert!(dispatch(&mut session, "RETR").await.starts_with("501 "));
        assert!(dispatch(&mut session, "STOR").await.starts_with("501 "));
    }

    #[tokio::test]
    async fn malformed_active_mode_arguments() {
        let (_dir, mut session) = test_session();
        assert!(dispatch(&mut session, "PORT 1,2,3").await.starts_with("501 "));
        assert!(dispatch(&mut session, "PORT").await.starts_with("501 "));
        assert!(dispatch(&mut session, "EPRT |9|10.0.0.1|21|").await.starts_with("522 "));
        assert!(session.data_channel.is_none());
    }

    #[tokio::test]
    async fn passive_listing_of_directory_and_file() {
        let mut client = Client::connect().await;
        client.login().await;
        std::fs::write(client.root.join("alpha.txt"), b"a").unwrap();
        std::fs::create_dir(client.root.join("beta")).unwrap();

        let mut data = client.passive().await;
        let reply = client.command("LIST").await;
        assert!(reply.starts_with("125 "), "{}", reply);
        let mut listing = String::new();
        data.read_to_string(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("226 "));

        let mut names: Vec<&str> = listing.split_terminator("\r\n").collect();
        names.sort_unstable();
        assert_eq!(names, vec!["alpha.txt", "beta"]);

        let mut data = client.extended_passive().await;
        assert!(client.command("NLST alpha.txt").await.starts_with("125 "));
        let mut listing = String::new();
        data.read_to_string(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("226 "));
        assert_eq!(listing, "alpha.txt\r\n");

        client.quit().await;
    }

    #[tokio::test]
    async fn listing_missing_path_sends_no_data() {
        let mut client = Client::connect().await;
        let mut data = client.passive().await;

        assert_eq!(
            client.command("LIST nothere").await,
            "550 File does not exist.\r\n"
        );
        let mut received = Vec::new();
        data.read_to_end(&mut received).await.unwrap();
        assert!(received.is_empty());

        // The channel was consumed.
        assert!(client.command("LIST").await.starts_with("425 "));
        client.quit().await;
    }

    #[tokio::test]
    async fn binary_store_and_retrieve_round_trip() {
        let mut client = Client::connect().await;
        client.login().await;
        assert!(client.command("TYPE I").await.starts_with("200 "));

        let payload: Vec<u8> = (0..=255u8).cycle().take(300_000).collect();
        let reply = client.store("blob.bin", &payload).await;
        assert!(reply.starts_with("226 "), "{}", reply);
        assert_eq!(std::fs::read(client.root.join("blob.bin")).unwrap(), payload);

        let reply = client.store("blob.bin", b"overwrite attempt").await;
        assert_eq!(reply, "550 File already exists\r\n");
        assert_eq!(std::fs::read(client.root.join("blob.bin")).unwrap(), payload);

        let (reply, received) = client.retrieve("blob.bin").await;
        assert!(reply.starts_with("226 "), "{}", reply);
        assert_eq!(received, payload);

        client.quit().await;
    }

    #[tokio::test]
    async fn ascii_transfers_normalize_line_endings() {
        let mut client = Client::connect().await;
        client.login().await;

        let reply = client.store("notes.txt", b"first\r\nsecond\r\n").await;
        assert!(reply.starts_with("226 "), "{}", reply);
        let mut expected = Vec::new();
        for line in [&b"first"[..], b"second"] {
            expected.extend_from_slice(line);
            expected.extend_from_slice(NATIVE_EOL);
        }
        assert_eq!(std::fs::read(client.root.join("notes.txt")).unwrap(), expected);

        std::fs::write(client.root.join("unix.txt"), b"one\ntwo").unwrap();
        let (reply, received) = client.retrieve("unix.txt").await;
        assert!(reply.starts_with("226 "), "{}", reply);
        assert_eq!(received, b"one\r\ntwo\r\n");

        client.quit().await;
    }

    #[tokio::test]
    async fn active_mode_listing() {
        let mut client = Client::connect().await;
        std::fs::write(client.root.join("only.txt"), b"x").unwrap();

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reply = client
            .command(&format!("PORT 127,0,0,1,{},{}", port / 256, port % 256))
            .await;
        assert_eq!(reply, "200 Command OK\r\n");
        let (mut data, _) = listener.accept().await.unwrap();

        assert!(client.command("NLST").await.starts_with("125 "));
        let mut listing = String::new();
        data.read_to_string(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("226 "));
        assert_eq!(listing, "only.txt\r\n");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let reply = client
            .command(&format!("EPRT |1|127.0.0.1|{}|", port))
            .await;
        assert_eq!(reply, "200 Command OK\r\n");
        listener.accept().await.unwrap();

        client.quit().await;
    }

    #[tokio::test]
    async fn new_data_connection_closes_the_previous_one() {
        let mut client = Client::connect().await;
        std::fs::write(client.root.join("only.txt"), b"x").unwrap();

        let mut first = client.passive().await;
        let mut second = client.extended_passive().await;

        let mut stale = Vec::new();
        assert_eq!(first.read_to_end(&mut stale).await.unwrap(), 0);

        assert!(client.command("NLST").await.starts_with("125 "));
        let mut listing = String::new();
        second.read_to_string(&mut listing).await.unwrap();
        assert!(client.reply().await.starts_with("226 "));
        assert_eq!(listing, "only.txt\r\n");

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut third = client.passive().await;
        let reply = client
            .command(&format!("PORT 127,0,0,1,{},{}", port / 256, port % 256))
            .await;
        assert_eq!(reply, "200 Command OK\r\n");
        listener.accept().await.unwrap();
        let mut stale = Vec::new();
        assert_eq!(third.read_to_end(&mut stale).await.unwrap(), 0);

        client.quit().await;
    }

    #[tokio::test]
    async fn broken_data_connection_aborts_transfer() {
        let mut client = Client::connect().await;
        client.login().await;
        assert!(client.command("TYPE I").await.starts_with("200 "));
        let payload = vec![7u8; 32 * 1024 * 1024];
        std::fs::write(client.root.join("big.bin"), &payload).unwrap();

        let data = client.passive().await;
        drop(data);

        let reply = client.command("RETR big.bin").await;
        assert!(reply.starts_with("150 "), "{}", reply);
        assert_eq!(
            client.reply().await,
            "426 Connection closed; transfer aborted.\r\n"
        );

        // The channel went away with the failed transfer.
        assert!(client.command("LIST").await.starts_with("425 "));
        assert!(client.command("NOOP").await.starts_with("200 "));
        client.quit().await;
    }

    #[tokio::test]
    async fn fixed_data_port_is_reused_across_transfers() {
        let data_port = free_port().await;
        let mut client = Client::connect_on_port(data_port).await;
        client.login().await;
        std::fs::write(client.root.join("hi.txt"), b"hi\n").unwrap();

        for _ in 0..3 {
            let (port, mut data) = client.passive_with_port().await;
            assert_eq!(port, data_port);
            let reply = client.command("RETR hi.txt").await;
            assert!(reply.starts_with("150 "), "{}", reply);
            let mut received = Vec::new();
            data.read_to_end(&mut received).await.unwrap();
            assert!(client.reply().await.starts_with("226 "));
            assert_eq!(received, b"hi\r\n");
        }

        client.quit().await;
    }

    #[tokio::test]
    async fn client_disconnect_ends_session_cleanly() {
        let client = Client::connect().await;
        let Client {
            reader,
            writer,
            task,
            _dir,
            ..
        } = client;
        drop(reader);
        drop(writer);
        task.await.unwrap().unwrap();
    }
}
