//! 按域名累计的可用性计数
//!
//! 计数器在某个域名第一次被探测时创建，此后只增不删，
//! 遍历顺序为域名首次出现的顺序。

use serde::Serialize;
use std::collections::HashMap;

/// 提取URL中的域名
///
/// 按 `/` 切分后取第三段，即 `://` 与下一个 `/` 之间的部分（可能带端口或用户信息）。
/// 没有第三段时返回整个URL。
pub fn domain_of(url: &str) -> &str {
    url.split('/').nth(2).unwrap_or(url)
}

/// 单个域名的计数器
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainCounters {
    /// 总探测次数
    pub total: u64,
    /// 健康次数
    pub successful: u64,
}

impl DomainCounters {
    /// 记录一次探测结果
    pub fn record(&mut self, healthy: bool) {
        self.total += 1;
        if healthy {
            self.successful += 1;
        }
    }

    /// 可用性百分比，尚未探测时为 `None`
    pub fn percentage(&self) -> Option<f64> {
        (self.total > 0).then(|| 100.0 * self.successful as f64 / self.total as f64)
    }
}

/// 所有域名的计数器
#[derive(Debug, Clone, Default)]
pub struct AvailabilityTally {
    entries: Vec<(String, DomainCounters)>,
    index: HashMap<String, usize>,
}

impl AvailabilityTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 把一次探测结果计入URL所属域名
    pub fn record(&mut self, url: &str, healthy: bool) {
        let domain = domain_of(url);
        let position = match self.index.get(domain) {
            Some(&position) => position,
            None => {
                self.entries
                    .push((domain.to_string(), DomainCounters::default()));
                let position = self.entries.len() - 1;
                self.index.insert(domain.to_string(), position);
                position
            }
        };
        self.entries[position].1.record(healthy);
    }

    /// 查询某个域名的计数器
    pub fn get(&self, domain: &str) -> Option<&DomainCounters> {
        self.index.get(domain).map(|&position| &self.entries[position].1)
    }

    /// 按首次出现顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainCounters)> {
        self.entries
            .iter()
            .map(|(domain, counters)| (domain.as_str(), counters))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 生成当前的可用性快照
    pub fn snapshot(&self) -> AvailabilitySnapshot {
        let domains = self
            .iter()
            .filter_map(|(domain, counters)| {
                counters.percentage().map(|percentage| DomainAvailability {
                    domain: domain.to_string(),
                    percentage,
                    counters: *counters,
                })
            })
            .collect();

        AvailabilitySnapshot { domains }
    }
}

/// 单个域名的可用性
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainAvailability {
    pub domain: String,
    /// 0 到 100 之间
    pub percentage: f64,
    pub counters: DomainCounters,
}

impl DomainAvailability {
    /// 报告行，百分比取整
    pub fn render(&self) -> String {
        format!(
            "{}: has {:.0}% availability percentage",
            self.domain, self.percentage
        )
    }
}

/// 某一时刻所有域名的可用性
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AvailabilitySnapshot {
    pub domains: Vec<DomainAvailability>,
}

impl AvailabilitySnapshot {
    /// 每个域名一行
    pub fn render_lines(&self) -> Vec<String> {
        self.domains.iter().map(DomainAvailability::render).collect()
    }

    pub fn get(&self, domain: &str) -> Option<&DomainAvailability> {
        self.domains.iter().find(|entry| entry.domain == domain)
    }
}
