/// Creates a progress bar over a list of pipeline stages.
///
/// `$stages` is anything with a `len()`; `$label` is appended to the template and the current
/// stage name is shown as the bar message.
#[macro_export]
macro_rules! init_progress {
    ($stages:expr, $label:expr) => {{
        let pb = $crate::indicatif::ProgressBar::new($stages.len() as u64);
        let mut template = "{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} "
            .to_string();
        template += $label;
        template += ": {msg}";
        if let Ok(style) = $crate::indicatif::ProgressStyle::with_template(&template) {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_position(0);
        pb
    }};
}

/// Marks stage `$index` as done and shows the next stage name, if any.
#[macro_export]
macro_rules! update_progress {
    ($pb:ident, $index:expr) => {
        $pb.set_position(($index + 1) as u64);
    };
    ($pb:ident, $index:expr, $msg:expr) => {
        $pb.set_message($msg);
        $pb.set_position(($index + 1) as u64);
    };
}
