//! `show ip bgp scan[ detail]` as the vty layer would dispatch it: parse
//! the trailing `detail` keyword, delegate to `nht_scan::show`.

use nht_scan::config::ScanConfig;
use nht_scan::Scanner;

pub fn dispatch(args: &[&str], config: &ScanConfig, scanner: &Scanner) -> String {
    match args {
        ["detail"] => nht_scan::show::show_detail(config, scanner),
        [] => nht_scan::show::show_summary(config, scanner),
        _ => format!("% unrecognized argument to 'show ip bgp scan': {}", args.join(" ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unrecognized_argument_is_reported() {
        let config = ScanConfig::new();
        let scanner = Scanner::new();
        let out = dispatch(&["bogus"], &config, &scanner);
        assert!(out.starts_with('%'));
    }

    #[test]
    fn empty_args_gives_summary() {
        let config = ScanConfig::new();
        let scanner = Scanner::new();
        let out = dispatch(&[], &config, &scanner);
        assert!(out.contains("BGP scan is running"));
    }
}
