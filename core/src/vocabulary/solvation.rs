use super::tagged_enum;

tagged_enum! {
    /// An implicit solvation model.
    pub enum SolvationModel as "solvation model" {
        Pcm => "pcm",
        Cpcm => "cpcm",
        Alpb => "alpb",
        Cosmo => "cosmo",
        Gbsa => "gbsa",
        CpcmX => "cpcmx",
    }
}

tagged_enum! {
    pub enum Solvent as "solvent" {
        Water => "water",
        Nitromethane => "nitromethane",
        Nitrobenzene => "nitrobenzene",
        Toluene => "toluene",
        Benzene => "benzene",
        Chlorobenzene => "chlorobenzene",
        CarbonTetrachloride => "carbontetrachloride",
        Dichloroethane => "dichloroethane",
        Dichloromethane => "dichloromethane",
        Chloroform => "chloroform",
        DiethylEther => "diethylether",
        DiisopropylEther => "diisopropylether",
        Dimethylsulfoxide => "dimethylsulfoxide",
        Tetrahydrofuran => "tetrahydrofuran",
        Cyclohexane => "cyclohexane",
        Octane => "octane",
        AceticAcid => "aceticacid",
        Hexane => "hexane",
        EthylAcetate => "ethylacetate",
        Acetone => "acetone",
        Acetonitrile => "acetonitrile",
        Methanol => "methanol",
        Ethanol => "ethanol",
        Isopropanol => "isopropanol",
        Dimethylacetamide => "dimethylacetamide",
        Dimethylformamide => "dimethylformamide",
        NMethylpyrrolidone => "n_methylpyrrolidone",
        EthyleneGlycol => "ethylene_glycol",
    }
}
