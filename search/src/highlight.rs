use utils_common::fold;

/// 高亮处理标题文本
///
/// 匹配时忽略大小写和变音符号，输出中保留标题原文，
/// 命中部分用 `<mark>` 包裹。
pub fn highlight_title(title: &str, term: &str) -> String {
    let needle: Vec<char> = fold(term.trim()).chars().collect();
    if title.is_empty() || needle.is_empty() {
        return title.to_string();
    }

    // 折叠后的每个字符对应原文中的字节区间
    let mut folded: Vec<char> = Vec::with_capacity(title.len());
    let mut origin: Vec<(usize, usize)> = Vec::with_capacity(title.len());
    let mut buf = [0u8; 4];
    for (start, c) in title.char_indices() {
        let end = start + c.len_utf8();
        let piece = fold(c.encode_utf8(&mut buf));
        if piece.is_empty() {
            // 单独的组合标记归入前一个字符
            if let Some(last) = origin.last_mut() {
                last.1 = end;
            }
            continue;
        }
        for f in piece.chars() {
            folded.push(f);
            origin.push((start, end));
        }
    }

    let mut ranges: Vec<(usize, usize)> = Vec::new();
    let mut i = 0;
    while i + needle.len() <= folded.len() {
        if folded[i..i + needle.len()] == needle[..] {
            let start = origin[i].0;
            let end = origin[i + needle.len() - 1].1;
            match ranges.last_mut() {
                Some(last) if start <= last.1 => last.1 = last.1.max(end),
                _ => ranges.push((start, end)),
            }
            i += needle.len();
        } else {
            i += 1;
        }
    }

    if ranges.is_empty() {
        return title.to_string();
    }

    let mut highlighted = String::with_capacity(title.len() + ranges.len() * 13);
    let mut last_pos = 0;
    for (start, end) in ranges {
        highlighted.push_str(&title[last_pos..start]);
        highlighted.push_str("<mark>");
        highlighted.push_str(&title[start..end]);
        highlighted.push_str("</mark>");
        last_pos = end;
    }
    highlighted.push_str(&title[last_pos..]);

    highlighted
}
