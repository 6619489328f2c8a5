//! In-process stand-in for a Redis connection. Understands the handful of commands the queue
//! issues and keeps their effects in memory.
use redis::aio::ConnectionLike;
use redis::{Arg, Cmd, ErrorKind, Pipeline, RedisError, RedisFuture, RedisResult, Value};
use std::collections::{BTreeSet, HashMap, VecDeque};
use std::sync::{Arc, Mutex};

#[derive(Clone, Copy)]
enum Fault {
    /// Every command fails as if the socket was gone. Nothing is applied.
    Connection,
    /// Every command is counted but answered with this integer instead of being applied.
    Reply(i64),
}

#[derive(Default)]
struct Store {
    sets: HashMap<String, BTreeSet<String>>,
    lists: HashMap<String, VecDeque<String>>,
    zsets: HashMap<String, HashMap<String, i64>>,
    commands: usize,
}

impl Store {
    fn apply(&mut self, args: &[String]) -> RedisResult<Value> {
        let (name, rest) = args
            .split_first()
            .ok_or_else(|| RedisError::from((ErrorKind::ClientError, "empty command")))?;
        let (key, rest) = rest
            .split_first()
            .ok_or_else(|| RedisError::from((ErrorKind::ResponseError, "missing key")))?;
        match name.to_ascii_uppercase().as_str() {
            "SADD" => {
                let set = self.sets.entry(key.clone()).or_default();
                let added = rest.iter().filter(|m| set.insert((*m).clone())).count();
                Ok(Value::Int(added as i64))
            }
            "LPUSH" => {
                let list = self.lists.entry(key.clone()).or_default();
                for item in rest {
                    list.push_front(item.clone());
                }
                Ok(Value::Int(list.len() as i64))
            }
            "ZADD" => {
                let zset = self.zsets.entry(key.clone()).or_default();
                let mut added = 0;
                for pair in rest.chunks(2) {
                    let [score, member] = pair else {
                        return Err((ErrorKind::ResponseError, "syntax error").into());
                    };
                    let score = score.parse().map_err(|_| {
                        RedisError::from((ErrorKind::ResponseError, "value is not a valid float"))
                    })?;
                    if zset.insert(member.clone(), score).is_none() {
                        added += 1;
                    }
                }
                Ok(Value::Int(added))
            }
            _ => Err((ErrorKind::ResponseError, "unknown command").into()),
        }
    }
}

#[derive(Clone, Default)]
pub(crate) struct MockRedis {
    store: Arc<Mutex<Store>>,
    fault: Option<Fault>,
}

impl MockRedis {
    /// A handle to the same data whose commands fail with an I/O error.
    pub fn disconnected(&self) -> Self {
        Self {
            store: self.store.clone(),
            fault: Some(Fault::Connection),
        }
    }

    /// A handle to the same data that answers every command with `reply`.
    pub fn replying(&self, reply: i64) -> Self {
        Self {
            store: self.store.clone(),
            fault: Some(Fault::Reply(reply)),
        }
    }

    /// How many commands reached the store.
    pub fn commands(&self) -> usize {
        self.store.lock().unwrap().commands
    }

    pub fn sismember(&self, key: &str, member: &str) -> bool {
        let store = self.store.lock().unwrap();
        store.sets.get(key).map_or(false, |s| s.contains(member))
    }

    pub fn scard(&self, key: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.sets.get(key).map_or(0, BTreeSet::len)
    }

    pub fn llen(&self, key: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.lists.get(key).map_or(0, VecDeque::len)
    }

    pub fn lindex(&self, key: &str, index: usize) -> Option<String> {
        let store = self.store.lock().unwrap();
        store.lists.get(key).and_then(|l| l.get(index).cloned())
    }

    pub fn zscore(&self, key: &str, member: &str) -> Option<i64> {
        let store = self.store.lock().unwrap();
        store.zsets.get(key).and_then(|z| z.get(member).copied())
    }

    pub fn zcard(&self, key: &str) -> usize {
        let store = self.store.lock().unwrap();
        store.zsets.get(key).map_or(0, HashMap::len)
    }

    /// Every key holding data, sorted.
    pub fn keys(&self) -> Vec<String> {
        let store = self.store.lock().unwrap();
        let mut keys: Vec<String> = store
            .sets
            .keys()
            .chain(store.lists.keys())
            .chain(store.zsets.keys())
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    fn execute(&self, cmd: &Cmd) -> RedisResult<Value> {
        if let Some(Fault::Connection) = self.fault {
            return Err((ErrorKind::IoError, "connection refused").into());
        }
        let args: Vec<String> = cmd
            .args_iter()
            .filter_map(|arg| match arg {
                Arg::Simple(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
                Arg::Cursor => None,
            })
            .collect();
        let mut store = self.store.lock().unwrap();
        store.commands += 1;
        match self.fault {
            Some(Fault::Reply(reply)) => Ok(Value::Int(reply)),
            _ => store.apply(&args),
        }
    }
}

impl ConnectionLike for MockRedis {
    fn req_packed_command<'a>(&'a mut self, cmd: &'a Cmd) -> RedisFuture<'a, Value> {
        let result = self.execute(cmd);
        Box::pin(async move { result })
    }

    fn req_packed_commands<'a>(
        &'a mut self,
        pipeline: &'a Pipeline,
        offset: usize,
        count: usize,
    ) -> RedisFuture<'a, Vec<Value>> {
        let result = pipeline
            .cmd_iter()
            .map(|cmd| self.execute(cmd))
            .collect::<RedisResult<Vec<_>>>()
            .map(|replies| replies.into_iter().skip(offset).take(count).collect());
        Box::pin(async move { result })
    }

    fn get_db(&self) -> i64 {
        0
    }
}
