//! TUI 改写演示
//!
//! 使用 crossterm 和 ratatui 构建的终端小编辑器，演示 redline-core 的建议
//! 改写流程：选中一段文本，发起改写，建议生成期间可以继续编辑（高亮会跟随
//! 编辑移动），最后应用或取消。
//!
//! # 用法
//!
//! ```bash
//! cargo run -p tui-redline -- <file_path>
//! ```
//!
//! # 自定义规则（可选）
//!
//! 默认使用 redline-rewrite-simple 的内置规则（空白整理 + ASCII 标点）。
//! 通过环境变量可以换成自定义 JSON 规则文件：
//!
//! ```bash
//! REDLINE_RULES_FILE=rules.json cargo run -p tui-redline -- draft.txt
//! ```
//!
//! # 快捷键
//!
//! - 方向键: 移动光标
//! - Shift+方向键: 选择文本
//! - Home/End: 行首/行尾
//! - PageUp/PageDown: 翻页
//! - Ctrl+W: 选中光标处的单词
//! - Ctrl+R: 对选中文本发起改写（输入规则名，留空运行整套规则）
//! - Ctrl+Y: 应用当前建议
//! - Esc: 取消建议 / 清除选择
//! - Ctrl+S: 保存文件
//! - Ctrl+X: 退出
//! - Backspace/Delete/Enter/Tab: 编辑
//! - 支持粘贴事件

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};
use redline_core::{
    AcceptOutcome, CharRange, DEFAULT_TAB_WIDTH, Document, Edit, EditSession, HighlightKind,
    Notice, NoticeLevel, Selection, SuggestionRequest, SuggestionSource, Transaction,
    cell_width_at,
};
use redline_rewrite_simple::{RegexRewriter, RewriteRule};
use std::{
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    process,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

/// 调用规则引擎前的模拟延迟，让 loading 高亮和"边等边改"可见。
const PROVIDER_DELAY: Duration = Duration::from_millis(400);

/// 请求携带的上下文：选区前后各取这么多字符。
const CONTEXT_CHARS: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InputMode {
    Normal,
    Instruction,
}

/// 在途的改写请求。
struct PendingSuggestion {
    request: SuggestionRequest,
    started: Instant,
}

/// 应用状态
struct App {
    /// 编辑会话（文档、选区、跟踪范围、建议面板）
    session: EditSession,
    /// 改写规则引擎（建议的来源）
    rewriter: RegexRewriter,
    /// 文件路径
    file_path: PathBuf,
    /// 是否需要退出
    should_quit: bool,
    /// 确认退出模式（如果有未保存修改）
    confirm_quit: bool,
    /// 状态消息
    status_message: String,
    /// 状态消息级别（决定状态行颜色）
    status_level: NoticeLevel,
    /// 会话通知的接收端（回调写入，主循环取出）
    notices: Arc<Mutex<Vec<Notice>>>,
    /// 视口顶部的行号
    scroll_top: usize,
    /// 视口高度（渲染时更新）
    viewport_height: usize,
    /// 当前输入模式（Normal/Instruction）
    input_mode: InputMode,
    /// 输入缓冲区（改写指令 prompt）
    input_buffer: String,
    /// 在途的改写请求（延迟到期后运行规则引擎）
    pending: Option<PendingSuggestion>,
    /// 已生成、等待应用的建议
    suggestion: Option<String>,
}

impl App {
    /// 创建新的应用实例
    fn new(file_path: PathBuf) -> io::Result<Self> {
        // 读取文件内容（如果存在）
        let content = if file_path.exists() {
            fs::read_to_string(&file_path)?
        } else {
            String::new()
        };

        let mut session = EditSession::new();
        session.open_document(&content);

        // 订阅通知：回调只负责入队，呈现交给状态行
        let notices = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&notices);
        session.on_notice(move |notice| {
            if let Ok(mut sink) = sink.lock() {
                sink.push(notice.clone());
            }
        });

        let (rewriter, rules_status) = load_rewriter();

        let mut app = Self {
            session,
            rewriter,
            file_path,
            should_quit: false,
            confirm_quit: false,
            status_message: String::new(),
            status_level: NoticeLevel::Info,
            notices,
            scroll_top: 0,
            viewport_height: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            pending: None,
            suggestion: None,
        };
        app.set_status(NoticeLevel::Info, rules_status);
        Ok(app)
    }

    /// 处理键盘事件
    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        // 确认退出模式
        if self.confirm_quit {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    if let Err(e) = self.save_file() {
                        self.set_status(NoticeLevel::Error, format!("保存失败: {}", e));
                        self.confirm_quit = false;
                    } else {
                        self.should_quit = true;
                    }
                }
                KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.should_quit = true;
                }
                KeyCode::Esc => {
                    self.confirm_quit = false;
                    self.status_message.clear();
                }
                _ => {}
            }
            return;
        }

        if self.input_mode != InputMode::Normal {
            self.handle_prompt_key(key);
            return;
        }

        // 处理普通按键
        match (key.modifiers, key.code) {
            // Ctrl+S: 保存
            (KeyModifiers::CONTROL, KeyCode::Char('s')) => {
                if let Err(e) = self.save_file() {
                    self.set_status(NoticeLevel::Error, format!("保存失败: {}", e));
                } else {
                    self.set_status(
                        NoticeLevel::Success,
                        format!("已保存: {}", self.file_path.display()),
                    );
                }
            }

            // Ctrl+X: 退出
            (KeyModifiers::CONTROL, KeyCode::Char('x')) => {
                if self.session.is_modified() {
                    self.confirm_quit = true;
                    self.set_status(NoticeLevel::Warning, "文件已修改。保存吗? (y/n)".to_string());
                } else {
                    self.should_quit = true;
                }
            }

            // Ctrl+W: 选中光标处的单词
            (KeyModifiers::CONTROL, KeyCode::Char('w')) => {
                self.select_word();
            }

            // Ctrl+R: 发起改写
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => {
                self.start_rewrite();
            }

            // Ctrl+Y: 应用建议
            (KeyModifiers::CONTROL, KeyCode::Char('y')) => {
                self.apply_suggestion();
            }

            // Esc: 取消建议 / 清除选择
            (_, KeyCode::Esc) => {
                self.dismiss();
            }

            // 方向键移动
            (mods, KeyCode::Left) => {
                self.move_left(mods.contains(KeyModifiers::SHIFT));
            }
            (mods, KeyCode::Right) => {
                self.move_right(mods.contains(KeyModifiers::SHIFT));
            }
            (mods, KeyCode::Up) => {
                self.move_by_lines(-1, mods.contains(KeyModifiers::SHIFT));
            }
            (mods, KeyCode::Down) => {
                self.move_by_lines(1, mods.contains(KeyModifiers::SHIFT));
            }

            // Home/End
            (mods, KeyCode::Home) => {
                self.move_home(mods.contains(KeyModifiers::SHIFT));
            }
            (mods, KeyCode::End) => {
                self.move_end(mods.contains(KeyModifiers::SHIFT));
            }

            // PageUp/PageDown
            (_, KeyCode::PageUp) => {
                self.page_up();
            }
            (_, KeyCode::PageDown) => {
                self.page_down();
            }

            // Backspace
            (_, KeyCode::Backspace) => {
                self.backspace();
            }

            // Delete
            (_, KeyCode::Delete) => {
                self.delete_forward();
            }

            // Enter
            (_, KeyCode::Enter) => {
                self.insert_newline();
            }

            // Tab
            (_, KeyCode::Tab) => {
                self.insert_tab();
            }

            // 普通字符输入
            (_, KeyCode::Char(c)) => {
                self.insert_char(c);
            }

            _ => {}
        }

        // 更新滚动位置以跟随光标
        self.adjust_scroll();
    }

    /// 改写指令 prompt 的按键处理
    fn handle_prompt_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                self.session.close_overlay();
                self.set_status(NoticeLevel::Info, "已取消改写".to_string());
            }
            KeyCode::Enter => {
                self.submit_instruction();
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    /// Ctrl+R：从当前选区打开建议面板，然后进入指令输入。
    /// 空选区先尝试按单词扩展，跟图形端按钮的行为一致。
    fn start_rewrite(&mut self) {
        if self.session.overlay().is_some() {
            self.set_status(NoticeLevel::Info, "已有打开的改写建议".to_string());
            return;
        }
        if self.session.selection().is_empty() {
            self.select_word();
        }
        if !self.session.try_open_from_selection() {
            // 失败原因已经通过通知回调给出
            return;
        }
        self.input_mode = InputMode::Instruction;
        self.input_buffer.clear();
    }

    /// Enter：带着指令向规则引擎发起请求。
    fn submit_instruction(&mut self) {
        let instruction = {
            let trimmed = self.input_buffer.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        };
        self.input_mode = InputMode::Normal;
        self.input_buffer.clear();

        let Some(request) = self
            .session
            .suggestion_request(instruction.as_deref(), CONTEXT_CHARS)
        else {
            self.session.close_overlay();
            return;
        };

        self.session.set_suggestion_loading(true);
        self.pending = Some(PendingSuggestion {
            request,
            started: Instant::now(),
        });
        self.set_status(NoticeLevel::Info, "正在生成改写建议…".to_string());
    }

    /// 主循环每轮检查在途请求；延迟到期后同步运行规则引擎。
    /// 等待期间用户可以继续编辑，跟踪范围会跟着移动。
    fn poll_provider(&mut self) {
        if self.session.overlay().is_none() {
            // 面板已关（Esc 或接受），丢弃在途请求
            self.pending = None;
            return;
        }

        let ready = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.started.elapsed() >= PROVIDER_DELAY);
        if !ready {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match self.rewriter.suggest(&pending.request) {
            Ok(text) => {
                self.session.set_suggestion_loading(false);
                if text == pending.request.selected_text {
                    self.set_status(NoticeLevel::Info, "规则没有产生改动（Esc 关闭）".to_string());
                } else {
                    self.set_status(
                        NoticeLevel::Info,
                        "建议已生成（Ctrl+Y 应用，Esc 取消）".to_string(),
                    );
                }
                self.suggestion = Some(text);
            }
            Err(e) => {
                self.session.set_suggestion_loading(false);
                self.session.close_overlay();
                self.set_status(NoticeLevel::Error, format!("改写失败: {}", e));
            }
        }
    }

    /// Ctrl+Y：把当前建议交回会话验证并应用。
    fn apply_suggestion(&mut self) {
        let Some(suggestion) = self.suggestion.take() else {
            self.set_status(NoticeLevel::Info, "没有待应用的建议".to_string());
            return;
        };

        let request = self.session.accept_request(suggestion);
        match self.session.accept_suggestion(&request) {
            AcceptOutcome::Applied { range } => {
                self.session.set_selection(Selection::caret(range.to));
            }
            AcceptOutcome::Rejected => {
                // 拒绝原因由通知回调给出
            }
        }
        self.pending = None;
    }

    /// Esc：关掉建议面板；没有面板时清除选择。
    fn dismiss(&mut self) {
        if self.session.overlay().is_some() || self.pending.is_some() || self.suggestion.is_some() {
            self.pending = None;
            self.suggestion = None;
            self.session.close_overlay();
            self.set_status(NoticeLevel::Info, "已取消改写".to_string());
            return;
        }

        let selection = self.session.selection();
        if !selection.is_empty() {
            self.session.set_selection(Selection::caret(selection.head));
        }
    }

    /// 把选区扩展到单词边界（光标落在词内时选中那个词）
    fn select_word(&mut self) {
        let expanded = {
            let Some(doc) = self.session.document() else {
                return;
            };
            self.session.selection().expand_to_words(doc)
        };
        if expanded.is_empty() {
            self.set_status(NoticeLevel::Info, "光标处没有单词".to_string());
            return;
        }
        self.session.set_selection(expanded);
    }

    // --- 编辑 ---

    fn apply(&mut self, edit: &Edit) -> Option<Transaction> {
        match self.session.apply_edit(edit) {
            Ok(txn) => Some(txn),
            Err(e) => {
                self.set_status(NoticeLevel::Error, format!("编辑失败: {}", e));
                None
            }
        }
    }

    /// 插入文本；有选区时替换选区
    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let selection = self.session.selection();
        let edit = if selection.is_empty() {
            Edit::Insert {
                at: selection.head,
                text: text.to_string(),
            }
        } else {
            Edit::Replace {
                range: selection.range(),
                text: text.to_string(),
            }
        };
        // 替换后把光标收到插入文本之后（纯插入时选区映射已经做对了）
        let collapse = (!selection.is_empty()).then(|| selection.min() + text.chars().count());
        if self.apply(&edit).is_none() {
            return;
        }
        if let Some(head) = collapse {
            self.session.set_selection(Selection::caret(head));
        }
    }

    /// 插入单个字符
    fn insert_char(&mut self, c: char) {
        self.insert_text(&c.to_string());
    }

    /// 插入换行
    fn insert_newline(&mut self) {
        self.insert_text("\n");
    }

    /// 插入 Tab（按制表位渲染）
    fn insert_tab(&mut self) {
        self.insert_text("\t");
    }

    /// 删除选中文本
    fn delete_selection(&mut self) {
        let range = self.session.selection().range();
        if range.is_empty() {
            return;
        }
        self.apply(&Edit::Delete { range });
    }

    /// 退格删除
    fn backspace(&mut self) {
        let selection = self.session.selection();
        if !selection.is_empty() {
            self.delete_selection();
            return;
        }
        if selection.head == 0 {
            return;
        }
        self.apply(&Edit::Delete {
            range: CharRange::new(selection.head - 1, selection.head),
        });
    }

    /// Delete 键删除
    fn delete_forward(&mut self) {
        let selection = self.session.selection();
        if !selection.is_empty() {
            self.delete_selection();
            return;
        }
        let len = self.doc_len();
        if selection.head >= len {
            return;
        }
        self.apply(&Edit::Delete {
            range: CharRange::new(selection.head, selection.head + 1),
        });
    }

    /// 处理粘贴事件（IME 支持）
    fn handle_paste(&mut self, text: String) {
        let len = text.chars().count();
        self.insert_text(&text);
        self.set_status(NoticeLevel::Info, format!("粘贴了 {} 个字符", len));
        self.adjust_scroll();
    }

    // --- 光标移动 ---

    fn doc_len(&self) -> usize {
        self.session
            .document()
            .map(|doc| doc.len_chars())
            .unwrap_or(0)
    }

    fn set_caret(&mut self, head: usize, selecting: bool) {
        let selection = if selecting {
            Selection::new(self.session.selection().anchor, head)
        } else {
            Selection::caret(head)
        };
        self.session.set_selection(selection);
    }

    /// 向左移动光标
    fn move_left(&mut self, selecting: bool) {
        let head = self.session.selection().head;
        self.set_caret(head.saturating_sub(1), selecting);
    }

    /// 向右移动光标
    fn move_right(&mut self, selecting: bool) {
        let head = self.session.selection().head;
        self.set_caret(head.saturating_add(1), selecting);
    }

    /// 上下移动（保持视觉列）
    fn move_by_lines(&mut self, delta: isize, selecting: bool) {
        let new_head = {
            let Some(doc) = self.session.document() else {
                return;
            };
            let head = self.session.selection().head;
            let (line, target_x) = doc.point_at(head, DEFAULT_TAB_WIDTH);
            let last_line = doc.len_lines().saturating_sub(1);
            let target_line = if delta >= 0 {
                line.saturating_add(delta as usize).min(last_line)
            } else {
                line.saturating_sub(delta.unsigned_abs())
            };
            if target_line == line {
                return;
            }
            Self::offset_for_visual_x(doc, target_line, target_x)
        };
        self.set_caret(new_head, selecting);
    }

    /// 移动到行首
    fn move_home(&mut self, selecting: bool) {
        let new_head = {
            let Some(doc) = self.session.document() else {
                return;
            };
            doc.offset_of_line(doc.line_of_offset(self.session.selection().head))
        };
        self.set_caret(new_head, selecting);
    }

    /// 移动到行尾
    fn move_end(&mut self, selecting: bool) {
        let new_head = {
            let Some(doc) = self.session.document() else {
                return;
            };
            let line = doc.line_of_offset(self.session.selection().head);
            doc.offset_of_line(line)
                + doc
                    .line_text(line)
                    .map(|text| text.chars().count())
                    .unwrap_or(0)
        };
        self.set_caret(new_head, selecting);
    }

    /// 向上翻页
    fn page_up(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        self.move_by_lines(-(self.viewport_height as isize), false);
    }

    /// 向下翻页
    fn page_down(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        self.move_by_lines(self.viewport_height as isize, false);
    }

    /// 目标行里最接近 `target_x` 的字符偏移（按渲染宽度走，制表位展开）
    fn offset_for_visual_x(doc: &Document, line: usize, target_x: usize) -> usize {
        let start = doc.offset_of_line(line);
        let text = doc.line_text(line).unwrap_or_default();
        let mut x = 0usize;
        let mut offset = start;
        for ch in text.chars() {
            let w = cell_width_at(ch, x, DEFAULT_TAB_WIDTH);
            if x + w > target_x {
                break;
            }
            x += w;
            offset += 1;
        }
        offset
    }

    /// 调整滚动位置以跟随光标
    fn adjust_scroll(&mut self) {
        if self.viewport_height == 0 {
            return;
        }
        let Some(doc) = self.session.document() else {
            return;
        };
        let line = doc.line_of_offset(self.session.selection().head);
        let total = doc.len_lines();

        let mut scroll_top = self.scroll_top;
        if line < scroll_top {
            scroll_top = line;
        }
        if line >= scroll_top + self.viewport_height {
            scroll_top = line - self.viewport_height + 1;
        }
        scroll_top = scroll_top.min(total.saturating_sub(self.viewport_height));
        self.scroll_top = scroll_top;
    }

    // --- 通知与状态 ---

    /// 把会话通知取出来放进状态行（只保留最后一条）
    fn drain_notices(&mut self) {
        let drained: Vec<Notice> = match self.notices.lock() {
            Ok(mut sink) => sink.drain(..).collect(),
            Err(_) => return,
        };
        if let Some(notice) = drained.into_iter().last() {
            self.status_level = notice.level;
            self.status_message = notice.message;
        }
    }

    fn set_status(&mut self, level: NoticeLevel, message: String) {
        self.status_level = level;
        self.status_message = message;
    }

    /// 保存文件
    fn save_file(&mut self) -> io::Result<()> {
        let Some(doc) = self.session.document() else {
            return Ok(());
        };
        fs::write(&self.file_path, doc.text_for_saving())?;
        self.session.mark_saved();
        Ok(())
    }

    // --- 渲染 ---

    /// 渲染 UI
    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // 编辑器区域
                Constraint::Length(1), // 状态行
                Constraint::Length(1), // 快捷键提示
            ])
            .split(frame.area());

        let editor_area = chunks[0];
        self.viewport_height = editor_area.height.saturating_sub(2) as usize;
        self.adjust_scroll();

        self.render_editor(frame, editor_area);
        self.render_overlay(frame, editor_area);
        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    /// 渲染编辑器内容
    fn render_editor(&self, frame: &mut Frame, area: Rect) {
        let inner_height = area.height.saturating_sub(2) as usize;
        let inner_width = area.width.saturating_sub(2) as usize;

        let selection = self.session.selection();
        let (sel_from, sel_to) = (selection.min(), selection.max());
        let highlight = self.session.highlight();

        let mut display_lines = Vec::with_capacity(inner_height);

        if let Some(doc) = self.session.document() {
            for i in 0..inner_height {
                let line = self.scroll_top + i;
                if inner_width == 0 || line >= doc.len_lines() {
                    display_lines.push(Line::from(""));
                    continue;
                }

                let line_start = doc.offset_of_line(line);
                let text = doc.line_text(line).unwrap_or_default();

                let mut spans: Vec<Span> = Vec::new();
                let mut current_style: Option<Style> = None;
                let mut buffer = String::new();
                let mut x = 0usize;

                for (idx, ch) in text.chars().enumerate() {
                    if x >= inner_width {
                        break;
                    }
                    let offset = line_start + idx;

                    let mut style = Style::default().fg(Color::White);
                    if let Some(h) = &highlight {
                        if offset >= h.range.from && offset < h.range.to {
                            // 跟踪范围的两种高亮：待定 / 生成中
                            style = match h.kind {
                                HighlightKind::Pending => {
                                    Style::default().fg(Color::White).bg(Color::DarkGray)
                                }
                                HighlightKind::Loading => {
                                    Style::default().fg(Color::Black).bg(Color::Yellow)
                                }
                            };
                        }
                    }
                    if offset >= sel_from && offset < sel_to {
                        style = style.bg(Color::Blue).fg(Color::White);
                    }

                    if current_style.is_none() {
                        current_style = Some(style);
                    }
                    if current_style != Some(style) {
                        spans.push(Span::styled(
                            std::mem::take(&mut buffer),
                            current_style.unwrap_or_default(),
                        ));
                        current_style = Some(style);
                    }

                    let w = cell_width_at(ch, x, DEFAULT_TAB_WIDTH);
                    if ch == '\t' {
                        for _ in 0..w {
                            buffer.push(' ');
                        }
                    } else {
                        buffer.push(ch);
                    }
                    x += w;
                }

                if !buffer.is_empty() {
                    spans.push(Span::styled(buffer, current_style.unwrap_or_default()));
                }
                display_lines.push(Line::from(spans));
            }
        }

        let paragraph = Paragraph::new(display_lines).block(
            Block::default().borders(Borders::ALL).title(format!(
                " {} {} ",
                self.file_path.display(),
                if self.session.is_modified() { "[+]" } else { "" },
            )),
        );
        frame.render_widget(paragraph, area);

        // 渲染光标
        if inner_height == 0 || inner_width == 0 {
            return;
        }
        let Some(doc) = self.session.document() else {
            return;
        };
        let head = self.session.selection().head;
        let (cursor_line, cursor_x) = doc.point_at(head, DEFAULT_TAB_WIDTH);
        if cursor_line < self.scroll_top || cursor_line >= self.scroll_top + inner_height {
            return;
        }

        let inner_left = area.x + 1;
        let inner_top = area.y + 1;
        let inner_right = area.x + area.width.saturating_sub(2);
        let inner_bottom = area.y + area.height.saturating_sub(2);
        if inner_left > inner_right || inner_top > inner_bottom {
            return;
        }

        let rel_row = (cursor_line - self.scroll_top) as u16;
        let x = (inner_left + cursor_x as u16).min(inner_right);
        let y = (inner_top + rel_row).min(inner_bottom);
        frame.set_cursor_position((x, y));
    }

    /// 渲染建议面板（锚在捕获时的选区末尾下方）
    fn render_overlay(&self, frame: &mut Frame, area: Rect) {
        let Some(overlay) = self.session.overlay() else {
            return;
        };

        let inner_left = area.x + 1;
        let inner_top = area.y + 1;
        let inner_width = area.width.saturating_sub(2);
        let inner_height = area.height.saturating_sub(2);
        if inner_width < 12 || inner_height < 5 {
            return;
        }

        let width = inner_width.min(48);
        let height = inner_height.min(5);

        let max_x = inner_width - width;
        let x = inner_left + overlay.anchor.x.min(max_x as usize) as u16;
        let rel_row = overlay
            .anchor
            .y
            .saturating_sub(self.scroll_top)
            .saturating_add(1);
        let max_y = inner_height - height;
        let y = inner_top + rel_row.min(max_y as usize) as u16;
        let popup = Rect::new(x, y, width, height);

        // 跟踪范围被编辑顶掉后，面板还开着但目标已经没了
        let stale = !self.session.tracker().is_active();
        let title = if stale {
            " 改写建议（目标已失效） "
        } else {
            " 改写建议 "
        };

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("原文: ", Style::default().fg(Color::DarkGray)),
            Span::raw(clip(&overlay.selected_text, 40)),
        ]));
        if overlay.loading {
            lines.push(Line::from(Span::styled(
                "正在生成…",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::ITALIC),
            )));
        } else if let Some(suggestion) = &self.suggestion {
            lines.push(Line::from(vec![
                Span::styled("建议: ", Style::default().fg(Color::DarkGray)),
                Span::styled(clip(suggestion, 40), Style::default().fg(Color::Green)),
            ]));
        } else {
            lines.push(Line::from(Span::styled(
                "等待指令…",
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::from(Span::styled(
            "Ctrl+Y 应用  Esc 取消",
            Style::default().fg(Color::DarkGray),
        )));

        let border = if stale {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .style(border);

        frame.render_widget(Clear, popup);
        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }

    /// 渲染状态行
    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let (status_text, style) = if self.input_mode == InputMode::Instruction {
            (
                format!(
                    "Rewrite > {}  (Enter=开始, Esc=取消, 留空=整套规则)",
                    self.input_buffer
                ),
                Style::default().bg(Color::DarkGray).fg(Color::White),
            )
        } else if !self.status_message.is_empty() {
            let style = match self.status_level {
                NoticeLevel::Error => Style::default().bg(Color::Red).fg(Color::White),
                NoticeLevel::Warning => Style::default().bg(Color::Yellow).fg(Color::Black),
                NoticeLevel::Success => Style::default().bg(Color::Green).fg(Color::Black),
                NoticeLevel::Info => Style::default().bg(Color::DarkGray).fg(Color::White),
            };
            (self.status_message.clone(), style)
        } else {
            let (line, column, chars) = self
                .session
                .document()
                .map(|doc| {
                    let (line, column) = doc.point_at(self.session.selection().head, DEFAULT_TAB_WIDTH);
                    (line + 1, column + 1, doc.len_chars())
                })
                .unwrap_or((1, 1, 0));
            (
                format!(
                    "行:{} 列:{} | 字符数:{} | 版本:{}",
                    line,
                    column,
                    chars,
                    self.session.version(),
                ),
                Style::default().bg(Color::DarkGray).fg(Color::White),
            )
        };

        let status_line = Paragraph::new(status_text).style(style.add_modifier(Modifier::BOLD));
        frame.render_widget(status_line, area);
    }

    /// 渲染快捷键提示
    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = if self.confirm_quit {
            "Y:保存并退出  N:不保存退出  Esc:取消".to_string()
        } else if self.input_mode == InputMode::Instruction {
            format!("规则: {}", self.rewriter.rule_names().join("  "))
        } else {
            "Ctrl-S:保存  Ctrl-X:退出  Ctrl-W:选词  Ctrl-R:改写  Ctrl-Y:应用建议  Esc:取消  Shift+方向键:选择"
                .to_string()
        };

        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

/// 预览截断：控制面板里单行长度，换行压成空格。
fn clip(text: &str, max_chars: usize) -> String {
    let mut out = String::new();
    for (i, ch) in text.chars().enumerate() {
        if i >= max_chars {
            out.push('…');
            break;
        }
        out.push(if ch == '\n' { ' ' } else { ch });
    }
    out
}

/// 规则引擎：环境变量给了 JSON 文件就用它，否则内置规则。
fn load_rewriter() -> (RegexRewriter, String) {
    if let Ok(path) = env::var("REDLINE_RULES_FILE") {
        match load_rules_file(&path) {
            Ok(rewriter) => {
                let message = format!("已加载改写规则: {}（{} 条）", path, rewriter.rules().len());
                return (rewriter, message);
            }
            Err(message) => {
                return (built_in_rewriter(), format!("{}；已回退到内置规则", message));
            }
        }
    }
    (
        built_in_rewriter(),
        "内置改写规则已启用（Ctrl+R 发起改写）".to_string(),
    )
}

fn load_rules_file(path: &str) -> Result<RegexRewriter, String> {
    let json = fs::read_to_string(path)
        .map_err(|e| format!("读取规则文件失败（{}）: {}", path, e))?;
    RegexRewriter::from_json_str(&json).map_err(|e| format!("解析规则文件失败（{}）: {}", path, e))
}

fn built_in_rewriter() -> RegexRewriter {
    let mut rules: Vec<RewriteRule> = Vec::new();
    if let Ok(tidy) = RegexRewriter::tidy_default() {
        rules.extend(tidy.rules().to_vec());
    }
    if let Ok(ascii) = RegexRewriter::ascii_default() {
        rules.extend(ascii.rules().to_vec());
    }
    RegexRewriter::new(rules)
}

fn main() -> io::Result<()> {
    // 获取命令行参数
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("用法: {} <file_path>", args[0]);
        eprintln!("\n示例:");
        eprintln!("  {} draft.txt", args[0]);
        eprintln!("\n环境变量:");
        eprintln!("  REDLINE_RULES_FILE=rules.json  自定义改写规则（JSON）");
        process::exit(1);
    }

    let file_path = PathBuf::from(&args[1]);

    // 设置终端
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // 创建应用
    let mut app = App::new(file_path)?;

    // 主循环
    let result = run_app(&mut terminal, &mut app);

    // 恢复终端
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("错误: {}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.poll_provider();
        app.drain_notices();
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        // 处理事件
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) => {
                    app.handle_key_event(key);
                }
                Event::Paste(text) => {
                    app.handle_paste(text);
                }
                Event::Resize(_, _) => {
                    // 重新渲染
                }
                _ => {}
            }
        }
    }

    Ok(())
}
