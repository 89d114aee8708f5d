/// 由页码换算出的结果窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: usize,
    pub limit: usize,
}

impl PageWindow {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// 页码从1开始，小于等于0时按第1页处理
    pub fn for_page(page: i64, page_size: u32) -> Self {
        let page = page.max(1);
        let offset = u64::try_from(page - 1)
            .unwrap_or(0)
            .saturating_mul(u64::from(page_size));

        Self {
            offset: usize::try_from(offset).unwrap_or(usize::MAX),
            limit: page_size as usize,
        }
    }

    /// 窗口末尾（不含）
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }

    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        items.into_iter().skip(self.offset).take(self.limit).collect()
    }
}

/// 总页数 `total / page_size + 1`
///
/// 总数恰好是页大小的整数倍时会多出一页，总数为0时仍有1页。
pub fn page_count(total_matching_rows: u64, page_size: u32) -> u64 {
    total_matching_rows / u64::from(page_size.max(1)) + 1
}

/// 扫描过程中的累计计数，扫描中断时据此报告部分结果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunningCount {
    rows_read: usize,
    matching: u64,
}

impl RunningCount {
    pub fn record_row(&mut self) {
        self.rows_read += 1;
    }

    pub fn record_match(&mut self) {
        self.matching += 1;
    }

    pub fn rows_read(&self) -> usize {
        self.rows_read
    }

    pub fn matching(&self) -> u64 {
        self.matching
    }
}
