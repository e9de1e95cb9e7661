use std::io::Write;
use tracing::warn;
use yaseek_core::{Identifier, ResolverKind};
use yaseek_scanner::{CrawlObserver, Resolver};

/// Prints crawl progress and per-query blocks as they arrive.
pub struct ConsolePrinter<W> {
    out: W,
    broken: bool,
}

impl<W: Write + Send> ConsolePrinter<W> {
    pub fn new(out: W) -> Self {
        Self { out, broken: false }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        if self.broken {
            return;
        }
        if let Err(e) = self.out.write_all(text.as_bytes()).and_then(|()| self.out.flush()) {
            warn!(error = %e, "console output failed; further output suppressed");
            self.broken = true;
        }
    }
}

impl<W: Write + Send> CrawlObserver for ConsolePrinter<W> {
    fn on_dispatch(&mut self, _kind: ResolverKind, identifier: &Identifier) {
        self.emit(&format!(
            "[*] Get info by {} `{}`...\n\n",
            identifier.field, identifier.value
        ));
    }

    fn on_resolved(&mut self, resolver: &Resolver, provider: &str) {
        let rendered: String = resolver
            .materialize(provider)
            .iter()
            .map(ToString::to_string)
            .collect();
        self.emit(&rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use yaseek_core::FactMap;
    use yaseek_scanner::QueryResult;

    #[test]
    fn test_prints_header_then_blocks() {
        let mut printer = ConsolePrinter::new(Vec::new());
        let identifier = Identifier::new("username", "alice");
        printer.on_dispatch(ResolverKind::Username, &identifier);

        let mut resolver = Resolver::new(ResolverKind::Username, identifier);
        resolver.record(QueryResult {
            id: "music".to_string(),
            title: "Music".to_string(),
            facts: FactMap::new(),
            failure: None,
        });
        printer.on_resolved(&resolver, "Yandex");

        let output = String::from_utf8(printer.into_inner()).expect("utf-8");
        assert_eq!(
            output,
            "[*] Get info by username `alice`...\n\n[+] Yandex.Music\n\tNot found.\n\n"
        );
    }
}
