//! 毫秒时间戳序号
//! 书籍 ID 与资源文件名都形如 `<prefix>_<millis>`，同一毫秒内的多次调用顺延到下一个值

use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct StampSource {
    last: AtomicU64,
}

impl StampSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 返回当前毫秒时间戳；若不大于上一次返回值，则取上一次 + 1
    pub fn next(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self
                .last
                .compare_exchange_weak(prev, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}
