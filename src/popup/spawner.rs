use rand::Rng;

/// What the spawner decided to put on screen for one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpawnKind {
    Text(String),
    Animated { rotating_head: bool },
}

/// Weighted choice between text and animated popups plus the rotating phrase
/// cursor. The cursor advances on every text spawn, including ones whose text
/// is replaced by the heightened phrase.
pub struct PopupSpawner {
    phrases: Vec<String>,
    cursor: usize,
    heightened_phrase: String,
    text_probability: f64,
    head_probability: f64,
}

impl PopupSpawner {
    pub fn new(
        phrases: Vec<String>,
        heightened_phrase: String,
        text_probability: f64,
        head_probability: f64,
    ) -> Self {
        Self {
            phrases,
            cursor: 0,
            heightened_phrase,
            text_probability: text_probability.clamp(0.0, 1.0),
            head_probability: head_probability.clamp(0.0, 1.0),
        }
    }

    #[cfg(test)]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn next_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, heightened: bool) -> SpawnKind {
        if rng.random::<f64>() < self.text_probability {
            return SpawnKind::Text(self.next_text(heightened));
        }

        SpawnKind::Animated {
            rotating_head: rng.random::<f64>() < self.head_probability,
        }
    }

    pub fn next_text(&mut self, heightened: bool) -> String {
        if self.phrases.is_empty() {
            return self.heightened_phrase.clone();
        }

        let phrase = &self.phrases[self.cursor];
        self.cursor = (self.cursor + 1) % self.phrases.len();

        if heightened {
            self.heightened_phrase.clone()
        } else {
            phrase.clone()
        }
    }
}
