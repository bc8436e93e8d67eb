//! Redis-backed pool
//!
//! Keeps a small stack of idle `redis::Connection`s. A connection is checked
//! out for exactly one command and returned only if that command succeeded.

use bytes::Bytes;
use parking_lot::Mutex;
use redis::Connection;

use crate::error::StoreError;
use crate::protocol::{Command, CommandType, Reply};

use super::Pool;

/// Connection pool over a single Redis endpoint
pub struct RedisPool {
    client: redis::Client,

    /// Connections ready for reuse
    idle: Mutex<Vec<Connection>>,

    /// Upper bound on `idle`
    max_idle: usize,
}

impl RedisPool {
    /// Open a pool and check the endpoint answers PING
    pub fn open(url: &str, max_idle: usize) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)?;
        let pool = Self {
            client,
            idle: Mutex::new(Vec::with_capacity(max_idle)),
            max_idle: max_idle.max(1),
        };

        pool.execute(Command::Ping)?;
        tracing::debug!(url, "redis pool ready");

        Ok(pool)
    }

    /// Number of idle connections currently held
    pub fn idle_connections(&self) -> usize {
        self.idle.lock().len()
    }

    fn checkout(&self) -> Result<Connection, StoreError> {
        if let Some(conn) = self.idle.lock().pop() {
            return Ok(conn);
        }
        Ok(self.client.get_connection()?)
    }

    fn checkin(&self, conn: Connection) {
        let mut idle = self.idle.lock();
        if idle.len() < self.max_idle {
            idle.push(conn);
        }
    }
}

impl Pool for RedisPool {
    fn execute(&self, command: Command) -> Result<Reply, StoreError> {
        let mut conn = self.checkout()?;
        let reply = dispatch(&mut conn, command);

        if reply.is_ok() {
            self.checkin(conn);
        }

        reply
    }
}

/// Wire form of a command
fn build(command: &Command) -> redis::Cmd {
    let mut cmd = redis::cmd(command.command_type().name());
    match command {
        Command::Ping => {}
        Command::Scan { cursor, count } => {
            cmd.arg(*cursor).arg("COUNT").arg(*count);
        }
        Command::Dump { key } | Command::Pttl { key } => {
            cmd.arg(key.as_ref());
        }
        Command::Restore {
            key,
            ttl,
            value,
            replace,
        } => {
            cmd.arg(key.as_ref()).arg(*ttl).arg(value.as_ref());
            if *replace {
                cmd.arg("REPLACE");
            }
        }
    }
    cmd
}

fn dispatch(conn: &mut Connection, command: Command) -> Result<Reply, StoreError> {
    let cmd = build(&command);

    let reply = match command.command_type() {
        CommandType::Ping => Reply::Status(cmd.query::<String>(conn)?),
        CommandType::Scan => {
            let (next, keys): (u64, Vec<Vec<u8>>) = cmd.query(conn)?;
            Reply::scan_page(next, keys.into_iter().map(Bytes::from).collect())
        }
        CommandType::Dump => cmd
            .query::<Option<Vec<u8>>>(conn)?
            .map_or(Reply::Nil, |blob| Reply::Bulk(Bytes::from(blob))),
        CommandType::Pttl => Reply::Integer(cmd.query::<i64>(conn)?),
        CommandType::Restore => {
            cmd.query::<()>(conn)?;
            Reply::Ok
        }
    };

    Ok(reply)
}
