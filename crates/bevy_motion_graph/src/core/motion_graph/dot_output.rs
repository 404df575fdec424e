use std::{fs::File, io::BufWriter, path::Path};

use super::{ContactLabel, MotionGraph};

pub trait ToDot {
    fn to_dot(&self, f: &mut impl std::io::Write) -> std::io::Result<()>;

    fn dot_to_file(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        self.to_dot(&mut writer)?;
        Ok(())
    }

    fn dot_to_stdout(&self) -> std::io::Result<()> {
        let mut stdout = std::io::stdout();
        self.to_dot(&mut stdout)
    }
}

fn contact_color(contact: ContactLabel) -> &'static str {
    match contact {
        ContactLabel::LeftOnly => "lightblue",
        ContactLabel::RightOnly => "lightpink",
        ContactLabel::Both => "palegreen",
        ContactLabel::Airborne => "lightgray",
    }
}

impl ToDot for MotionGraph {
    /// One cluster per source clip. Splice edges are drawn in red.
    fn to_dot(&self, f: &mut impl std::io::Write) -> std::io::Result<()> {
        writeln!(f, "digraph {{")?;
        writeln!(f, "\trankdir=LR;")?;
        writeln!(f, "\tnode [shape=box, style=filled, fontsize=10];")?;

        let starts = self.sequence_starts();
        for (i, &start) in starts.iter().enumerate() {
            let end = starts.get(i + 1).copied().unwrap_or(self.states.len());
            let sequence = self.states[start].sequence;
            writeln!(f, "\tsubgraph cluster_{start} {{")?;
            writeln!(f, "\t\tlabel=\"clip {sequence}\";")?;
            for id in start..end {
                let state = &self.states[id];
                writeln!(
                    f,
                    "\t\t\"{id}\" [label=\"{id} ({}:{})\\n{:?}\", fillcolor={}];",
                    state.sequence,
                    state.index_in_sequence,
                    state.contact,
                    contact_color(state.contact)
                )?;
            }
            writeln!(f, "\t}}")?;
        }

        for (id, state) in self.states.iter().enumerate() {
            for &child in &state.children {
                if self.is_default_continuation(id, child) {
                    writeln!(f, "\t\"{id}\" -> \"{child}\";")?;
                } else {
                    writeln!(f, "\t\"{id}\" -> \"{child}\" [color=red];")?;
                }
            }
        }

        writeln!(f, "}}")?;

        Ok(())
    }
}
