//! Saturation driver and classification queries.

use crate::entity::{ClassId, EntitySpace, IndividualId, ObjectPropertyId};
use crate::error::{ClassifierError, InvariantViolation};
use crate::hierarchy::ClassHierarchy;
use crate::ontology::ExtendedOntology;
use crate::rules::{CompletionRule, apply_nominal_rule};
use crate::status::{ClassifierStatus, Entry};
use rustc_hash::FxHashSet;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, trace, warn};

/// Configuration of the classifier.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// Maximum number of queued facts handled by one [`RuleProcessor::process`] call.
    pub batch_size: usize,
    /// Maximum time allowed for [`RuleProcessor::classify`] (None = unlimited).
    pub timeout: Option<Duration>,
    /// Maximum number of nodes of the completion graph (None = unlimited).
    pub max_nodes: Option<usize>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            batch_size: 1024,
            timeout: None,
            max_nodes: None,
        }
    }
}

/// A flag shared with another thread to stop a running classification.
///
/// The processor only looks at it between two steps, so the state it leaves
/// behind is always consistent.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// How [`RuleProcessor::classify`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationOutcome {
    /// The fixpoint is reached and the queries are available.
    Complete,
    /// The cancellation token was triggered.
    Cancelled,
    /// The configured timeout elapsed.
    TimedOut,
}

/// Counters describing the state of a classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Statistics {
    pub classes: usize,
    pub nodes: usize,
    pub subsumers: usize,
    pub edges: usize,
    pub steps: usize,
    pub nominal_sweeps: usize,
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} classes, {} nodes, {} subsumers, {} edges after {} steps",
            self.classes, self.nodes, self.subsumers, self.edges, self.steps
        )?;
        if self.nominal_sweeps > 0 {
            write!(f, " and {} nominal sweeps", self.nominal_sweeps)?;
        }
        Ok(())
    }
}

/// Saturates the completion graph of an ontology and answers queries on it.
///
/// ```
/// use oxel::{ClassifierConfig, EntitySpace, ExtendedOntology, NormalizedAxiom, RuleProcessor};
/// use oxrdf::NamedNodeRef;
///
/// let mut entities = EntitySpace::new();
/// let dog = entities.class(NamedNodeRef::new("http://example.org/Dog")?);
/// let animal = entities.class(NamedNodeRef::new("http://example.org/Animal")?);
/// let ontology = ExtendedOntology::new(
///     &entities,
///     [NormalizedAxiom::Gci0 { sub: dog, sup: animal }],
/// )?;
/// let mut processor = RuleProcessor::new(ontology, &entities, ClassifierConfig::default());
/// while processor.process()? {}
/// assert!(processor.subsumers(dog)?.contains(&animal));
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct RuleProcessor {
    status: ClassifierStatus,
    config: ClassifierConfig,
    /// Classes with an IRI, ⊤ and ⊥ included.
    named_classes: Vec<ClassId>,
    named_class_set: FxHashSet<ClassId>,
    individuals: FxHashSet<IndividualId>,
    ready: bool,
    node_limit_reported: bool,
    steps: usize,
    nominal_sweeps: usize,
}

impl RuleProcessor {
    pub fn new(ontology: ExtendedOntology, entities: &EntitySpace, config: ClassifierConfig) -> Self {
        let named_classes = entities
            .classes()
            .filter(|class| !entities.is_auxiliary_class(*class))
            .collect::<Vec<_>>();
        debug!(
            axioms = ontology.axiom_count(),
            classes = named_classes.len(),
            "Creating the completion graph"
        );
        Self {
            status: ClassifierStatus::new(Arc::new(ontology), entities.generator()),
            config,
            named_class_set: named_classes.iter().copied().collect(),
            named_classes,
            individuals: entities.individuals().collect(),
            ready: false,
            node_limit_reported: false,
            steps: 0,
            nominal_sweeps: 0,
        }
    }

    /// Runs one step of the saturation.
    ///
    /// Returns `true` while some work remains. Facts are only ever added, so
    /// every result observed between two steps stays true afterwards.
    pub fn process(&mut self) -> Result<bool, ClassifierError> {
        if self.ready {
            return Ok(false);
        }
        self.steps += 1;
        let mut handled = 0;
        while handled < self.config.batch_size.max(1) {
            let Some(entry) = self.status.next_entry() else {
                break;
            };
            let rules = match entry {
                Entry::Subsumer { .. } => CompletionRule::SUBSUMER_RULES,
                Entry::Edge { .. } => CompletionRule::EDGE_RULES,
            };
            for rule in rules {
                rule.apply(&mut self.status, entry)?;
            }
            handled += 1;
        }
        self.check_node_limit()?;
        if self.status.has_pending_entries() {
            trace!(
                step = self.steps,
                handled,
                nodes = self.status.node_count(),
                "Saturation step"
            );
            return Ok(true);
        }

        self.nominal_sweeps += 1;
        if apply_nominal_rule(&mut self.status)? {
            debug!(step = self.steps, "Nominal rule added subsumers");
            return Ok(true);
        }
        self.ready = true;
        info!("Classification completed: {}", self.statistics());
        Ok(false)
    }

    /// Runs [`Self::process`] until the fixpoint, a cancellation or the timeout.
    ///
    /// Cancelling or timing out is not an error: the state stays valid and a
    /// later call resumes from it.
    pub fn classify(
        &mut self,
        cancellation: &CancellationToken,
    ) -> Result<ClassificationOutcome, ClassifierError> {
        let span = info_span!("classify", classes = self.named_classes.len());
        let _enter = span.enter();
        let start = Instant::now();
        while !self.ready {
            if cancellation.is_cancelled() {
                warn!("Classification cancelled: {}", self.statistics());
                return Ok(ClassificationOutcome::Cancelled);
            }
            if let Some(timeout) = self.config.timeout {
                if start.elapsed() >= timeout {
                    warn!(
                        "Classification timeout exceeded ({timeout:?}): {}",
                        self.statistics()
                    );
                    return Ok(ClassificationOutcome::TimedOut);
                }
            }
            self.process()?;
        }
        Ok(ClassificationOutcome::Complete)
    }

    /// The error is returned by the step crossing the limit; later steps go on.
    fn check_node_limit(&mut self) -> Result<(), ClassifierError> {
        if let Some(limit) = self.config.max_nodes {
            if !self.node_limit_reported && self.status.node_count() > limit {
                self.node_limit_reported = true;
                warn!(limit, "Completion graph node limit exceeded");
                return Err(ClassifierError::NodeLimitExceeded { limit });
            }
        }
        Ok(())
    }

    /// `true` once the fixpoint is reached.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn status(&self) -> &ClassifierStatus {
        &self.status
    }

    pub fn statistics(&self) -> Statistics {
        Statistics {
            classes: self.named_classes.len(),
            nodes: self.status.node_count(),
            subsumers: self.status.subsumer_count(),
            edges: self.status.edge_count(),
            steps: self.steps,
            nominal_sweeps: self.nominal_sweeps,
        }
    }

    fn ensure_ready(&self) -> Result<(), ClassifierError> {
        if self.ready {
            Ok(())
        } else {
            Err(ClassifierError::NotClassified)
        }
    }

    fn ensure_class(&self, class: ClassId) -> Result<(), ClassifierError> {
        if self.status.contains_node(class) {
            Ok(())
        } else {
            Err(InvariantViolation::UnknownClass(class).into())
        }
    }

    /// The named classes subsuming `class`, sorted.
    pub fn subsumers(&self, class: ClassId) -> Result<Vec<ClassId>, ClassifierError> {
        self.ensure_ready()?;
        self.ensure_class(class)?;
        Ok(self.named_subsumers(class))
    }

    fn named_subsumers(&self, node: ClassId) -> Vec<ClassId> {
        let mut subsumers = self
            .status
            .subsumers(node)
            .filter(|class| self.named_class_set.contains(class))
            .collect::<Vec<_>>();
        subsumers.sort_unstable();
        subsumers
    }

    pub fn is_satisfiable(&self, class: ClassId) -> Result<bool, ClassifierError> {
        self.ensure_ready()?;
        self.ensure_class(class)?;
        Ok(self.is_consistent()? && !self.status.has_subsumer(class, ClassId::BOTTOM))
    }

    /// `false` if ⊤ or a nominal is unsatisfiable.
    pub fn is_consistent(&self) -> Result<bool, ClassifierError> {
        self.ensure_ready()?;
        Ok(!self.status.has_subsumer(ClassId::TOP, ClassId::BOTTOM)
            && !self
                .status
                .nominal_classes()
                .iter()
                .any(|class| self.status.has_subsumer(*class, ClassId::BOTTOM)))
    }

    /// The properties subsuming `property`, itself and the top property included.
    pub fn object_property_subsumers(
        &self,
        property: ObjectPropertyId,
    ) -> Result<Vec<ObjectPropertyId>, ClassifierError> {
        self.ensure_ready()?;
        let properties = self.status.properties();
        if !properties.contains(property) {
            return Err(InvariantViolation::UnknownObjectProperty(property).into());
        }
        let mut subsumers = properties
            .super_object_properties(property)
            .iter()
            .copied()
            .filter(|sup| !properties.is_minted(*sup))
            .chain([ObjectPropertyId::TOP])
            .collect::<Vec<_>>();
        subsumers.sort_unstable();
        subsumers.dedup();
        Ok(subsumers)
    }

    /// The named classes the individual belongs to, sorted.
    pub fn types(&self, individual: IndividualId) -> Result<Vec<ClassId>, ClassifierError> {
        self.ensure_ready()?;
        if !self.individuals.contains(&individual) {
            return Err(InvariantViolation::UnknownIndividual(individual).into());
        }
        Ok(
            match self.status.ontology().nominal_class(individual) {
                Some(nominal) => self.named_subsumers(nominal),
                None => vec![ClassId::TOP],
            },
        )
    }

    /// The most specific named classes the individual belongs to.
    pub fn direct_types(&self, individual: IndividualId) -> Result<Vec<ClassId>, ClassifierError> {
        let types = self.types(individual)?;
        Ok(types
            .iter()
            .copied()
            .filter(|candidate| {
                !types.iter().any(|other| {
                    other != candidate
                        && self.status.has_subsumer(*other, *candidate)
                        && !self.status.has_subsumer(*candidate, *other)
                })
            })
            .collect())
    }

    /// The taxonomy of the named classes.
    pub fn hierarchy(&self) -> Result<ClassHierarchy, ClassifierError> {
        self.ensure_ready()?;
        Ok(ClassHierarchy::new(&self.named_classes, |class| {
            self.named_subsumers(class)
        }))
    }
}
